//! Mapping metadata: how members of domain types map onto database columns.

mod accessor;
pub use accessor::{Accessor, FieldAccessor};

mod association;
pub use association::Association;

mod auto_sync;
pub use auto_sync::AutoSync;

mod builder;
pub use builder::{AssociationDef, Builder, MemberDef, MemberHandles, TypeDef};

mod catalog;
pub use catalog::Catalog;

mod deferred;
pub use deferred::{Deferred, DeferredAccessor};

mod load;
pub use load::LoadMethod;

mod member;
pub use member::{Member, MemberId};

mod member_ref;
pub use member_ref::{MemberKind, MemberRef};

mod meta_type;
pub use meta_type::{MetaType, TypeId};

mod name;
pub use name::Name;

mod source;
pub use source::{
    AssociationMapping, Bindings, Document, MappingSource, MappingSourceKind, MemberMapping,
    TypeMapping,
};

mod update_check;
pub use update_check::UpdateCheck;

mod verify;
