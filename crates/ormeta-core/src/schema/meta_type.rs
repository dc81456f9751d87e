use super::{Member, MemberId};
use crate::stmt::Value;

use std::{fmt, sync::Arc};

/// Mapping metadata for one domain type.
#[derive(Debug)]
pub struct MetaType {
    /// Uniquely identifies the type within the catalog
    pub(crate) id: TypeId,

    /// Type name, as mapped
    pub(crate) name: String,

    /// Table the type's rows live in. Shared by every type of a hierarchy.
    pub(crate) table_name: String,

    /// Direct base type, for types in an inheritance hierarchy
    pub(crate) base: Option<TypeId>,

    /// All base types, nearest first
    pub(crate) ancestors: Vec<TypeId>,

    /// Direct subtypes
    pub(crate) derived: Vec<TypeId>,

    /// Discriminator value identifying rows of this type
    pub(crate) inheritance_code: Option<Value>,

    /// Rows with an unknown discriminator value materialize as this type
    pub(crate) is_inheritance_default: bool,

    /// Full member set in ordinal order; inherited members come first.
    pub(crate) members: Vec<Arc<Member>>,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct TypeId(pub usize);

impl MetaType {
    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn base(&self) -> Option<TypeId> {
        self.base
    }

    pub fn ancestors(&self) -> &[TypeId] {
        &self.ancestors
    }

    pub fn derived(&self) -> &[TypeId] {
        &self.derived
    }

    pub fn inheritance_code(&self) -> Option<&Value> {
        self.inheritance_code.as_ref()
    }

    pub fn is_inheritance_default(&self) -> bool {
        self.is_inheritance_default
    }

    /// Returns `true` if the type has no base type.
    pub fn is_root(&self) -> bool {
        self.base.is_none()
    }

    /// The root of this type's inheritance hierarchy.
    pub fn inheritance_root(&self) -> TypeId {
        self.ancestors.last().copied().unwrap_or(self.id)
    }

    pub fn has_inheritance(&self) -> bool {
        self.base.is_some() || !self.derived.is_empty()
    }

    /// Returns `true` if `ty` is a (direct or indirect) base of this type.
    pub fn inherits_from(&self, ty: impl Into<TypeId>) -> bool {
        self.ancestors.contains(&ty.into())
    }

    /// Every member, in ordinal order.
    pub fn members(&self) -> impl ExactSizeIterator<Item = &Member> + '_ {
        self.members.iter().map(|member| &**member)
    }

    /// Members declared by this type, excluding inherited ones.
    pub fn declared_members(&self) -> impl Iterator<Item = &Member> + '_ {
        self.members().filter(|member| member.declaring_type() == self.id)
    }

    pub fn member(&self, ordinal: usize) -> Option<&Member> {
        self.members.get(ordinal).map(|member| &**member)
    }

    pub fn member_by_name(&self, name: &str) -> Option<&Member> {
        self.members().find(|member| member.name() == name)
    }

    pub fn member_by_mapped_name(&self, mapped_name: &str) -> Option<&Member> {
        self.column_members()
            .find(|member| member.mapped_name() == mapped_name)
    }

    /// Members forming the type's identity, in ordinal order.
    pub fn identity_members(&self) -> impl Iterator<Item = &Member> + '_ {
        self.members().filter(|member| member.is_primary_key())
    }

    pub fn version_member(&self) -> Option<&Member> {
        self.members().find(|member| member.is_version())
    }

    pub fn discriminator_member(&self) -> Option<&Member> {
        self.members().find(|member| member.is_discriminator())
    }

    pub fn persistent_members(&self) -> impl Iterator<Item = &Member> + '_ {
        self.members().filter(|member| member.is_persistent())
    }

    /// Members mapped to a column of the type's table.
    pub fn column_members(&self) -> impl Iterator<Item = &Member> + '_ {
        self.members().filter(|member| member.is_column())
    }

    pub fn associations(&self) -> impl Iterator<Item = &Member> + '_ {
        self.members().filter(|member| member.is_association())
    }

    /// Members compared against the database before an update.
    ///
    /// When the type has a version member, only the version is compared.
    pub fn update_check_members(&self) -> Vec<&Member> {
        if let Some(version) = self.version_member() {
            return vec![version];
        }

        self.column_members()
            .filter(|member| !member.update_check().is_never())
            .collect()
    }

    pub fn has_any_deferred_members(&self) -> bool {
        self.members().any(|member| member.is_deferred())
    }
}

impl TypeId {
    /// Create a `MemberId` for the member of this type at `ordinal`.
    pub const fn member(self, ordinal: usize) -> MemberId {
        MemberId { ty: self, ordinal }
    }
}

impl From<&Self> for TypeId {
    fn from(src: &Self) -> Self {
        *src
    }
}

impl From<&MetaType> for TypeId {
    fn from(value: &MetaType) -> Self {
        value.id
    }
}

impl fmt::Debug for TypeId {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "TypeId({})", self.0)
    }
}
