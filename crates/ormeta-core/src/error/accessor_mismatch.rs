use super::Error;

/// Error when an accessor is handed an instance of the wrong type.
#[derive(Debug)]
pub(super) struct AccessorMismatch {
    expected: &'static str,
    member: Box<str>,
}

impl std::error::Error for AccessorMismatch {}

impl core::fmt::Display for AccessorMismatch {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "accessor for `{}` expected an instance of `{}`",
            self.member, self.expected
        )
    }
}

impl Error {
    /// Creates an accessor mismatch error.
    ///
    /// `expected` is the owner type the accessor was built for.
    pub fn accessor_mismatch(member: impl Into<String>, expected: &'static str) -> Error {
        Error::from(super::ErrorKind::AccessorMismatch(AccessorMismatch {
            expected,
            member: member.into().into(),
        }))
    }

    /// Returns `true` if this error is an accessor mismatch error.
    pub fn is_accessor_mismatch(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::AccessorMismatch(_))
    }
}
