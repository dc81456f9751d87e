mod external;
pub use external::{AssociationMapping, Bindings, Document, MemberMapping, TypeMapping};

use super::TypeDef;
use crate::Result;

/// Where mapping definitions come from.
#[derive(Debug)]
pub enum MappingSource {
    /// Definitions declared in code alongside the domain types.
    Attribute(Vec<TypeDef>),

    /// A mapping document kept apart from the domain types. Accessors and
    /// load methods are bound separately, by type and member name.
    External {
        document: Document,
        bindings: Bindings,
    },
}

/// Records which [`MappingSource`] variant a member was built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappingSourceKind {
    Attribute,
    External,
}

impl MappingSource {
    pub fn kind(&self) -> MappingSourceKind {
        match self {
            MappingSource::Attribute(_) => MappingSourceKind::Attribute,
            MappingSource::External { .. } => MappingSourceKind::External,
        }
    }

    /// Reads an external mapping document from JSON.
    pub fn from_json(json: &str, bindings: Bindings) -> Result<MappingSource> {
        Ok(MappingSource::External {
            document: Document::from_json(json)?,
            bindings,
        })
    }

    pub(crate) fn into_type_defs(self) -> Result<Vec<TypeDef>> {
        match self {
            MappingSource::Attribute(defs) => Ok(defs),
            MappingSource::External { document, bindings } => document.into_type_defs(bindings),
        }
    }
}

impl From<Vec<TypeDef>> for MappingSource {
    fn from(defs: Vec<TypeDef>) -> Self {
        MappingSource::Attribute(defs)
    }
}
