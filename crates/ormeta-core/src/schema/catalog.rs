use super::{Member, MemberId, MetaType, TypeId};
use crate::stmt::Value;

use indexmap::IndexMap;

/// All mapped types, as produced by [`Builder`](super::Builder).
///
/// The catalog is immutable and can be shared freely between threads.
#[derive(Debug, Default)]
pub struct Catalog {
    pub(crate) types: IndexMap<TypeId, MetaType>,

    /// Maps type names, as mapped, to identifiers
    pub(crate) by_name: IndexMap<String, TypeId>,
}

impl Catalog {
    pub fn types(&self) -> impl Iterator<Item = &MetaType> {
        self.types.values()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Get a type by ID
    #[track_caller]
    pub fn ty(&self, id: impl Into<TypeId>) -> &MetaType {
        self.types.get(&id.into()).expect("invalid type ID")
    }

    pub fn get_ty(&self, id: impl Into<TypeId>) -> Option<&MetaType> {
        self.types.get(&id.into())
    }

    pub fn ty_by_name(&self, name: &str) -> Option<&MetaType> {
        self.by_name.get(name).map(|id| self.ty(*id))
    }

    /// Get a member by ID
    #[track_caller]
    pub fn member(&self, id: MemberId) -> &Member {
        self.ty(id.ty).member(id.ordinal).expect("invalid member ID")
    }

    pub fn inheritance_root(&self, id: impl Into<TypeId>) -> &MetaType {
        let root = self.ty(id).inheritance_root();
        self.ty(root)
    }

    /// The type and all of its (direct and indirect) subtypes, base first.
    pub fn hierarchy(&self, id: impl Into<TypeId>) -> Vec<&MetaType> {
        let mut ret = vec![self.ty(id)];
        let mut next = 0;

        while next < ret.len() {
            let ty: &MetaType = ret[next];
            ret.extend(ty.derived().iter().map(|id| self.ty(*id)));
            next += 1;
        }

        ret
    }

    /// Finds the type a row belongs to from its discriminator value.
    ///
    /// Searches the hierarchy rooted at `root`. Falls back to the hierarchy's
    /// inheritance default when no type carries `code`.
    pub fn type_for_discriminator(
        &self,
        root: impl Into<TypeId>,
        code: &Value,
    ) -> Option<&MetaType> {
        let hierarchy = self.hierarchy(root);

        hierarchy
            .iter()
            .find(|ty| ty.inheritance_code() == Some(code))
            .or_else(|| hierarchy.iter().find(|ty| ty.is_inheritance_default()))
            .copied()
    }
}
