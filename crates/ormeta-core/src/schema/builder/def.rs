use crate::schema::{Accessor, AutoSync, LoadMethod, MemberKind, UpdateCheck};
use crate::stmt::{Type, Value};

use std::{fmt, sync::Arc};

/// Definition of a mapped domain type, before it is built.
#[derive(Debug, Clone)]
pub struct TypeDef {
    pub(crate) name: String,
    pub(crate) table: Option<String>,
    pub(crate) base: Option<String>,
    pub(crate) inheritance_code: Option<Value>,
    pub(crate) is_inheritance_default: bool,
    pub(crate) members: Vec<MemberDef>,
}

/// Definition of a mapped member, before it is built.
#[derive(Debug, Clone)]
pub struct MemberDef {
    pub(crate) name: String,
    pub(crate) kind: MemberKind,
    pub(crate) storage: Option<String>,
    pub(crate) ty: Type,
    pub(crate) column: Option<String>,
    pub(crate) db_type: Option<String>,
    pub(crate) expression: Option<String>,
    pub(crate) primary_key: bool,
    pub(crate) version: bool,
    pub(crate) discriminator: bool,
    pub(crate) db_generated: bool,
    pub(crate) persistent: bool,
    pub(crate) deferred: bool,
    pub(crate) can_be_null: Option<bool>,
    pub(crate) auto_sync: AutoSync,
    pub(crate) update_check: UpdateCheck,
    pub(crate) association: Option<AssociationDef>,
    pub(crate) handles: MemberHandles,
}

/// Definition of an association, keyed by member names.
#[derive(Debug, Clone, Default)]
pub struct AssociationDef {
    pub(crate) other_type: String,
    pub(crate) this_key: Vec<String>,
    pub(crate) other_key: Vec<String>,
    pub(crate) is_foreign_key: bool,
    pub(crate) is_many: bool,
    pub(crate) is_unique: bool,
    pub(crate) delete_rule: Option<String>,
    pub(crate) delete_on_null: bool,
}

/// Code-side handles bound to a member.
#[derive(Clone, Default)]
pub struct MemberHandles {
    pub(crate) accessor: Option<Arc<dyn Accessor>>,
    pub(crate) storage_accessor: Option<Arc<dyn Accessor>>,
    pub(crate) deferred_source: Option<Arc<dyn Accessor>>,
    pub(crate) deferred_value: Option<Arc<dyn Accessor>>,
    pub(crate) load: Option<LoadMethod>,
}

impl TypeDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            table: None,
            base: None,
            inheritance_code: None,
            is_inheritance_default: false,
            members: vec![],
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    /// Derives this type from `base`. The table is inherited from the base.
    pub fn base(mut self, base: impl Into<String>) -> Self {
        self.base = Some(base.into());
        self
    }

    pub fn inheritance_code(mut self, code: impl Into<Value>) -> Self {
        self.inheritance_code = Some(code.into());
        self
    }

    pub fn inheritance_default(mut self) -> Self {
        self.is_inheritance_default = true;
        self
    }

    pub fn member(mut self, member: MemberDef) -> Self {
        self.members.push(member);
        self
    }
}

impl MemberDef {
    /// A member mapped to a column.
    pub fn column(name: impl Into<String>, ty: Type) -> Self {
        Self {
            name: name.into(),
            kind: MemberKind::Property,
            storage: None,
            ty,
            column: None,
            db_type: None,
            expression: None,
            primary_key: false,
            version: false,
            discriminator: false,
            db_generated: false,
            persistent: true,
            deferred: false,
            can_be_null: None,
            auto_sync: AutoSync::Default,
            update_check: UpdateCheck::Always,
            association: None,
            handles: MemberHandles::default(),
        }
    }

    /// A member defining an association. Its value type is filled in from
    /// the other side when the catalog is built.
    pub fn association(name: impl Into<String>, association: AssociationDef) -> Self {
        Self {
            association: Some(association),
            ..Self::column(name, Type::Unknown)
        }
    }

    /// A data member of the domain type that is not mapped to the database.
    /// It has no column, and its accessor is optional.
    pub fn unmapped(name: impl Into<String>, ty: Type) -> Self {
        Self {
            persistent: false,
            ..Self::column(name, ty)
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declares the member as a plain field rather than a property.
    pub fn field(mut self) -> Self {
        self.kind = MemberKind::Field;
        self
    }

    /// Names the storage field backing the member.
    pub fn storage(mut self, storage: impl Into<String>) -> Self {
        self.storage = Some(storage.into());
        self
    }

    pub fn column_name(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }

    pub fn db_type(mut self, db_type: impl Into<String>) -> Self {
        self.db_type = Some(db_type.into());
        self
    }

    /// Maps the member to a computed column. Implies database generation.
    pub fn expression(mut self, expression: impl Into<String>) -> Self {
        self.expression = Some(expression.into());
        self
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    /// Marks the member as the row version. Implies database generation.
    pub fn version(mut self) -> Self {
        self.version = true;
        self
    }

    pub fn discriminator(mut self) -> Self {
        self.discriminator = true;
        self
    }

    pub fn db_generated(mut self) -> Self {
        self.db_generated = true;
        self
    }

    pub fn nullable(mut self) -> Self {
        self.can_be_null = Some(true);
        self
    }

    pub fn not_null(mut self) -> Self {
        self.can_be_null = Some(false);
        self
    }

    pub fn auto_sync(mut self, auto_sync: AutoSync) -> Self {
        self.auto_sync = auto_sync;
        self
    }

    pub fn update_check(mut self, update_check: UpdateCheck) -> Self {
        self.update_check = update_check;
        self
    }

    pub fn accessor(mut self, accessor: impl Accessor + 'static) -> Self {
        self.handles.accessor = Some(Arc::new(accessor));
        self
    }

    /// Accessor over the storage field. Defaults to the member accessor.
    pub fn storage_accessor(mut self, accessor: impl Accessor + 'static) -> Self {
        self.handles.storage_accessor = Some(Arc::new(accessor));
        self
    }

    /// Loads the member on first access.
    pub fn deferred(
        mut self,
        source: impl Accessor + 'static,
        value: impl Accessor + 'static,
        load: LoadMethod,
    ) -> Self {
        self.deferred = true;
        self.handles.deferred_source = Some(Arc::new(source));
        self.handles.deferred_value = Some(Arc::new(value));
        self.handles.load = Some(load);
        self
    }

    pub fn handles(mut self, handles: MemberHandles) -> Self {
        self.handles = handles;
        self
    }
}

impl AssociationDef {
    /// The member's declaring type holds a foreign key `this_key` referencing
    /// `other_type`. The other key defaults to the other type's primary key.
    pub fn foreign_key<S: AsRef<str>>(other_type: impl Into<String>, this_key: &[S]) -> Self {
        Self {
            other_type: other_type.into(),
            this_key: names(this_key),
            is_foreign_key: true,
            ..Self::default()
        }
    }

    /// The other type holds a foreign key `other_key` referencing this type;
    /// the member yields many instances. This key defaults to the declaring
    /// type's primary key.
    pub fn many<S: AsRef<str>>(other_type: impl Into<String>, other_key: &[S]) -> Self {
        Self {
            other_type: other_type.into(),
            other_key: names(other_key),
            is_many: true,
            ..Self::default()
        }
    }

    /// Like [`AssociationDef::many`], but the member yields at most one
    /// instance.
    pub fn one<S: AsRef<str>>(other_type: impl Into<String>, other_key: &[S]) -> Self {
        Self {
            other_type: other_type.into(),
            other_key: names(other_key),
            is_unique: true,
            ..Self::default()
        }
    }

    pub fn this_key<S: AsRef<str>>(mut self, this_key: &[S]) -> Self {
        self.this_key = names(this_key);
        self
    }

    pub fn other_key<S: AsRef<str>>(mut self, other_key: &[S]) -> Self {
        self.other_key = names(other_key);
        self
    }

    pub fn unique(mut self) -> Self {
        self.is_unique = true;
        self
    }

    pub fn delete_rule(mut self, rule: impl Into<String>) -> Self {
        self.delete_rule = Some(rule.into());
        self
    }

    pub fn delete_on_null(mut self) -> Self {
        self.delete_on_null = true;
        self
    }
}

impl MemberHandles {
    pub fn new(accessor: impl Accessor + 'static) -> Self {
        Self {
            accessor: Some(Arc::new(accessor)),
            ..Self::default()
        }
    }

    pub fn storage_accessor(mut self, accessor: impl Accessor + 'static) -> Self {
        self.storage_accessor = Some(Arc::new(accessor));
        self
    }

    pub fn deferred(
        mut self,
        source: impl Accessor + 'static,
        value: impl Accessor + 'static,
        load: LoadMethod,
    ) -> Self {
        self.deferred_source = Some(Arc::new(source));
        self.deferred_value = Some(Arc::new(value));
        self.load = Some(load);
        self
    }
}

impl fmt::Debug for MemberHandles {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.debug_struct("MemberHandles")
            .field("accessor", &self.accessor.is_some())
            .field("storage_accessor", &self.storage_accessor.is_some())
            .field("deferred_source", &self.deferred_source.is_some())
            .field("deferred_value", &self.deferred_value.is_some())
            .field("load", &self.load)
            .finish()
    }
}

fn names<S: AsRef<str>>(names: &[S]) -> Vec<String> {
    names.iter().map(|name| name.as_ref().to_string()).collect()
}
