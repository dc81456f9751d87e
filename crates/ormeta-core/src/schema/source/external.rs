use crate::schema::{
    AssociationDef, AutoSync, MemberDef, MemberHandles, MemberKind, TypeDef, UpdateCheck,
};
use crate::stmt::{Type, Value};
use crate::{Error, Result};

use indexmap::IndexMap;
use serde::Deserialize;

/// An external mapping document.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Document {
    pub types: Vec<TypeMapping>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TypeMapping {
    pub name: String,

    #[serde(default)]
    pub table: Option<String>,

    #[serde(default)]
    pub base: Option<String>,

    /// Discriminator value; a JSON string, integer or boolean.
    #[serde(default)]
    pub inheritance_code: Option<serde_json::Value>,

    #[serde(default)]
    pub is_inheritance_default: bool,

    #[serde(default)]
    pub members: Vec<MemberMapping>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MemberMapping {
    pub name: String,

    /// Value type: `bool`, `i32`, `i64`, `string` or `bytes`. Ignored for
    /// associations.
    #[serde(rename = "type", default)]
    pub ty: Option<String>,

    #[serde(default)]
    pub kind: MemberKind,

    #[serde(default)]
    pub storage: Option<String>,

    #[serde(default)]
    pub column: Option<String>,

    #[serde(default)]
    pub db_type: Option<String>,

    #[serde(default)]
    pub expression: Option<String>,

    #[serde(default)]
    pub primary_key: bool,

    #[serde(default)]
    pub version: bool,

    #[serde(default)]
    pub discriminator: bool,

    #[serde(default)]
    pub db_generated: bool,

    /// `false` for data members that are not mapped to the database.
    #[serde(default = "persistent_default")]
    pub persistent: bool,

    #[serde(default)]
    pub deferred: bool,

    #[serde(default)]
    pub can_be_null: Option<bool>,

    #[serde(default)]
    pub auto_sync: AutoSync,

    #[serde(default)]
    pub update_check: UpdateCheck,

    #[serde(default)]
    pub association: Option<AssociationMapping>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AssociationMapping {
    pub other_type: String,

    #[serde(default)]
    pub this_key: Vec<String>,

    #[serde(default)]
    pub other_key: Vec<String>,

    #[serde(default)]
    pub foreign_key: bool,

    #[serde(default)]
    pub many: bool,

    #[serde(default)]
    pub unique: bool,

    #[serde(default)]
    pub delete_rule: Option<String>,

    #[serde(default)]
    pub delete_on_null: bool,
}

/// Code-side handles for an external mapping, keyed by type and member name.
#[derive(Debug, Default)]
pub struct Bindings {
    members: IndexMap<(String, String), MemberHandles>,
}

impl Document {
    pub fn from_json(json: &str) -> Result<Document> {
        Ok(serde_json::from_str(json)?)
    }

    pub(crate) fn into_type_defs(self, mut bindings: Bindings) -> Result<Vec<TypeDef>> {
        let defs = self
            .types
            .into_iter()
            .map(|ty| ty.into_type_def(&mut bindings))
            .collect::<Result<Vec<_>>>()?;

        if let Some(((ty, member), _)) = bindings.members.first() {
            return Err(Error::invalid_mapping(format!(
                "binding for `{ty}::{member}` does not match any mapped member"
            )));
        }

        Ok(defs)
    }
}

impl TypeMapping {
    fn into_type_def(self, bindings: &mut Bindings) -> Result<TypeDef> {
        let mut def = TypeDef::new(&self.name);
        def.table = self.table;
        def.base = self.base;
        def.is_inheritance_default = self.is_inheritance_default;
        def.inheritance_code = self
            .inheritance_code
            .map(|code| code_to_value(&self.name, code))
            .transpose()?;

        for member in self.members {
            let handles = bindings.take(&self.name, &member.name);
            def.members.push(member.into_member_def(&self.name, handles)?);
        }

        Ok(def)
    }
}

impl MemberMapping {
    fn into_member_def(self, ty_name: &str, handles: MemberHandles) -> Result<MemberDef> {
        let mut def = match self.association {
            Some(association) => MemberDef::association(&self.name, association.into()),
            None => {
                let Some(ty) = &self.ty else {
                    return Err(Error::invalid_mapping(format!(
                        "member `{ty_name}::{}` has no type",
                        self.name
                    )));
                };
                let Some(ty) = Type::from_name(ty) else {
                    return Err(Error::invalid_mapping(format!(
                        "member `{ty_name}::{}` has unknown type `{ty}`",
                        self.name
                    )));
                };
                MemberDef::column(&self.name, ty)
            }
        };

        def.kind = self.kind;
        def.storage = self.storage;
        def.column = self.column;
        def.db_type = self.db_type;
        def.expression = self.expression;
        def.primary_key = self.primary_key;
        def.version = self.version;
        def.discriminator = self.discriminator;
        def.db_generated = self.db_generated;
        def.persistent = self.persistent;
        def.deferred = self.deferred;
        def.can_be_null = self.can_be_null;
        def.auto_sync = self.auto_sync;
        def.update_check = self.update_check;
        def.handles = handles;

        Ok(def)
    }
}

impl From<AssociationMapping> for AssociationDef {
    fn from(value: AssociationMapping) -> Self {
        AssociationDef {
            other_type: value.other_type,
            this_key: value.this_key,
            other_key: value.other_key,
            is_foreign_key: value.foreign_key,
            is_many: value.many,
            is_unique: value.unique,
            delete_rule: value.delete_rule,
            delete_on_null: value.delete_on_null,
        }
    }
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(
        mut self,
        ty: impl Into<String>,
        member: impl Into<String>,
        handles: MemberHandles,
    ) -> Self {
        self.members.insert((ty.into(), member.into()), handles);
        self
    }

    fn take(&mut self, ty: &str, member: &str) -> MemberHandles {
        self.members
            .shift_remove(&(ty.to_string(), member.to_string()))
            .unwrap_or_default()
    }
}

fn persistent_default() -> bool {
    true
}

fn code_to_value(ty_name: &str, code: serde_json::Value) -> Result<Value> {
    let value = match &code {
        serde_json::Value::Bool(v) => Some(Value::Bool(*v)),
        serde_json::Value::String(v) => Some(Value::String(v.clone())),
        serde_json::Value::Number(v) => v.as_i64().map(Value::I64),
        _ => None,
    };

    value.ok_or_else(|| {
        Error::invalid_mapping(format!(
            "type `{ty_name}` has unsupported inheritance code `{code}`"
        ))
    })
}
