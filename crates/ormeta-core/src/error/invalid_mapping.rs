use super::Error;

/// Error when mapping metadata cannot be built.
///
/// This occurs when:
/// - A primary key member is declared nullable
/// - An association is missing, or references an unknown type or key member
/// - A persistent member has no accessor bound to it
/// - An inheritance hierarchy names an unknown base type or forms a cycle
///
/// These errors are raised while the catalog is built, never when reading
/// metadata from an already built catalog.
#[derive(Debug)]
pub(super) struct InvalidMapping {
    message: Box<str>,
}

impl std::error::Error for InvalidMapping {}

impl core::fmt::Display for InvalidMapping {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "invalid mapping: {}", self.message)
    }
}

impl Error {
    /// Creates an invalid mapping error.
    pub fn invalid_mapping(message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::InvalidMapping(InvalidMapping {
            message: message.into().into(),
        }))
    }

    /// Returns `true` if this error is an invalid mapping error.
    pub fn is_invalid_mapping(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::InvalidMapping(_))
    }
}
