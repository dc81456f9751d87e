use super::{
    Accessor, Association, AutoSync, Catalog, LoadMethod, MappingSourceKind, MemberRef, MetaType,
    TypeId, UpdateCheck,
};
use crate::stmt;

use std::{fmt, sync::Arc};

/// Mapping metadata for one field or property of a domain type.
///
/// Members are built once by [`Builder`](super::Builder) and never change
/// afterwards. Every accessor below returns a value fixed at build time and
/// never fails.
#[derive(Clone)]
pub struct Member {
    pub(crate) id: MemberId,
    pub(crate) name: String,
    pub(crate) member: MemberRef,
    pub(crate) storage_member: MemberRef,
    pub(crate) mapped_name: String,
    pub(crate) db_type: Option<String>,
    pub(crate) expression: Option<String>,
    pub(crate) ty: stmt::Type,
    pub(crate) primary_key: bool,
    pub(crate) version: bool,
    pub(crate) discriminator: bool,
    pub(crate) db_generated: bool,
    pub(crate) persistent: bool,
    pub(crate) deferred: bool,
    pub(crate) can_be_null: bool,
    pub(crate) auto_sync: AutoSync,
    pub(crate) update_check: UpdateCheck,
    pub(crate) member_accessor: Option<Arc<dyn Accessor>>,
    pub(crate) storage_accessor: Option<Arc<dyn Accessor>>,
    pub(crate) deferred_source_accessor: Option<Arc<dyn Accessor>>,
    pub(crate) deferred_value_accessor: Option<Arc<dyn Accessor>>,
    pub(crate) association: Option<Association>,
    pub(crate) load_method: Option<LoadMethod>,
    pub(crate) source: MappingSourceKind,
}

/// Identifies a member by its declaring type and ordinal.
///
/// Ordinals of inherited members are shared by every subtype, so the id is
/// valid against the declaring type and all types deriving from it.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MemberId {
    pub ty: TypeId,
    pub ordinal: usize,
}

impl Member {
    pub fn id(&self) -> MemberId {
        self.id
    }

    /// The member name, as declared on the domain type.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Reference to the member as declared on the domain type.
    pub fn member(&self) -> &MemberRef {
        &self.member
    }

    /// Reference to the member holding the data. Same as [`Member::member`]
    /// unless the member is backed by a separate storage field.
    pub fn storage_member(&self) -> &MemberRef {
        &self.storage_member
    }

    pub fn declaring_type(&self) -> TypeId {
        self.id.ty
    }

    /// Position of the member in the default layout of query results.
    pub fn ordinal(&self) -> usize {
        self.id.ordinal
    }

    /// Name of the column (or constraint) in the database.
    pub fn mapped_name(&self) -> &str {
        &self.mapped_name
    }

    /// Database column type. `None` for members not mapped to a column.
    pub fn db_type(&self) -> Option<&str> {
        self.db_type.as_deref()
    }

    /// Expression defining a computed column.
    pub fn expression(&self) -> Option<&str> {
        self.expression.as_deref()
    }

    pub fn ty(&self) -> &stmt::Type {
        &self.ty
    }

    pub fn is_primary_key(&self) -> bool {
        self.primary_key
    }

    /// Member holds the row version or timestamp.
    pub fn is_version(&self) -> bool {
        self.version
    }

    /// Member holds the inheritance discriminator.
    pub fn is_discriminator(&self) -> bool {
        self.discriminator
    }

    /// Value is assigned by the database. Computed columns and row versions
    /// are always generated.
    pub fn is_db_generated(&self) -> bool {
        self.db_generated
    }

    /// Member is mapped to a column or, for associations, a constraint.
    pub fn is_persistent(&self) -> bool {
        self.persistent
    }

    /// Member is mapped to a column. Associations and unmapped members are
    /// not.
    pub fn is_column(&self) -> bool {
        self.persistent && self.association.is_none()
    }

    pub fn is_association(&self) -> bool {
        self.association.is_some()
    }

    /// Member is loaded on first access rather than with its row.
    pub fn is_deferred(&self) -> bool {
        self.deferred
    }

    pub fn can_be_null(&self) -> bool {
        self.can_be_null
    }

    pub fn auto_sync(&self) -> AutoSync {
        self.auto_sync
    }

    pub fn update_check(&self) -> UpdateCheck {
        self.update_check
    }

    pub fn member_accessor(&self) -> Option<&dyn Accessor> {
        self.member_accessor.as_deref()
    }

    pub fn storage_accessor(&self) -> Option<&dyn Accessor> {
        self.storage_accessor.as_deref()
    }

    /// Accessor over the load source of a deferred member.
    pub fn deferred_source_accessor(&self) -> Option<&dyn Accessor> {
        self.deferred_source_accessor.as_deref()
    }

    /// Accessor over the loaded value of a deferred member, without loading.
    pub fn deferred_value_accessor(&self) -> Option<&dyn Accessor> {
        self.deferred_value_accessor.as_deref()
    }

    pub fn association(&self) -> Option<&Association> {
        self.association.as_ref()
    }

    pub fn load_method(&self) -> Option<&LoadMethod> {
        self.load_method.as_ref()
    }

    /// Which mapping source the member was built from.
    pub fn source(&self) -> MappingSourceKind {
        self.source
    }

    /// Returns `true` if `ty` is the declaring type or derives from it.
    ///
    /// Types outside the declaring type's hierarchy, and base types of the
    /// declaring type, return `false`.
    pub fn is_declared_by(&self, ty: &MetaType) -> bool {
        ty.id() == self.id.ty || ty.inherits_from(self.id.ty)
    }

    /// Returns a fully qualified name for the member.
    pub fn full_name(&self, catalog: &Catalog) -> String {
        let ty = catalog.ty(self.id.ty);
        format!("{}::{}", ty.name(), self.name)
    }

    /// If the member is an association, return the type on the other side.
    pub fn association_target<'a>(&self, catalog: &'a Catalog) -> Option<&'a MetaType> {
        self.association
            .as_ref()
            .map(|association| association.other_type(catalog))
    }

    /// Member value is supplied by the object on insert.
    pub fn participates_in_insert(&self) -> bool {
        self.is_column() && !self.db_generated
    }

    /// Member value is written by an update.
    pub fn participates_in_update(&self) -> bool {
        self.is_column() && !self.db_generated && !self.primary_key
    }

    /// Member value is read back after insert.
    pub fn synced_on_insert(&self) -> bool {
        self.auto_sync.on_insert()
    }

    /// Member value is read back after update.
    pub fn synced_on_update(&self) -> bool {
        self.auto_sync.on_update()
    }
}

impl fmt::Debug for Member {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.debug_struct("Member")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("mapped_name", &self.mapped_name)
            .field("db_type", &self.db_type)
            .field("ty", &self.ty)
            .field("primary_key", &self.primary_key)
            .field("version", &self.version)
            .field("discriminator", &self.discriminator)
            .field("db_generated", &self.db_generated)
            .field("persistent", &self.persistent)
            .field("deferred", &self.deferred)
            .field("can_be_null", &self.can_be_null)
            .field("auto_sync", &self.auto_sync)
            .field("update_check", &self.update_check)
            .field("association", &self.association)
            .finish_non_exhaustive()
    }
}

impl From<&Member> for MemberId {
    fn from(val: &Member) -> Self {
        val.id
    }
}

impl fmt::Debug for MemberId {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "MemberId({}/{})", self.ty.0, self.ordinal)
    }
}
