use serde::Deserialize;

/// Opaque reference to a field or property of a domain type.
///
/// Stands in for a runtime reflection handle: it names the member and
/// records how it is declared, nothing more. Reading and writing the member
/// goes through an [`Accessor`](super::Accessor).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MemberRef {
    /// Name of the domain type declaring the member
    pub owner: String,

    /// Member name as declared on the domain type
    pub name: String,

    pub kind: MemberKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberKind {
    /// A plain data field
    Field,

    /// A property backed by get / set logic, possibly over a storage field
    #[default]
    Property,
}

impl MemberRef {
    pub fn new(owner: impl Into<String>, name: impl Into<String>, kind: MemberKind) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
            kind,
        }
    }

    pub fn is_field(&self) -> bool {
        matches!(self.kind, MemberKind::Field)
    }

    pub fn is_property(&self) -> bool {
        matches!(self.kind, MemberKind::Property)
    }
}
