use super::Value;
use crate::{schema::TypeId, Error, Result};

/// The value type of a mapped member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    /// Boolean value
    Bool,

    /// Signed 32-bit integer
    I32,

    /// Signed 64-bit integer
    I64,

    /// String type
    String,

    /// Raw bytes, used for row versions and binary columns
    Bytes,

    /// A single instance of a mapped type
    Model(TypeId),

    /// A list of a single type
    List(Box<Type>),

    /// A type that could not be determined
    Unknown,
}

impl Type {
    pub fn list(ty: impl Into<Self>) -> Self {
        Self::List(Box::new(ty.into()))
    }

    pub fn is_bytes(&self) -> bool {
        matches!(self, Self::Bytes)
    }

    /// Returns `true` for integer types a database can generate values for.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::I32 | Self::I64)
    }

    /// The database column type used when a member does not specify one.
    ///
    /// Returns `None` for types that never map to a single column (models and
    /// lists).
    pub fn default_db_type(&self, default_string: &str) -> Option<String> {
        let db_type = match self {
            Self::Bool => "Bit",
            Self::I32 => "Int",
            Self::I64 => "BigInt",
            Self::String => default_string,
            Self::Bytes => "VarBinary(MAX)",
            Self::Model(_) | Self::List(_) | Self::Unknown => return None,
        };

        Some(db_type.to_string())
    }

    /// Parses the short type names used by external mapping documents.
    pub fn from_name(name: &str) -> Option<Type> {
        Some(match name {
            "bool" => Self::Bool,
            "i32" => Self::I32,
            "i64" => Self::I64,
            "string" => Self::String,
            "bytes" => Self::Bytes,
            _ => return None,
        })
    }

    /// Returns `true` if `value` can be stored in a member of this type.
    ///
    /// Null is accepted by every type; nullability is checked separately.
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (_, Value::Null) => true,
            (Self::Bool, Value::Bool(_)) => true,
            (Self::I32, Value::I32(_)) => true,
            (Self::I64, Value::I64(_) | Value::I32(_)) => true,
            (Self::String, Value::String(_)) => true,
            (Self::Bytes, Value::Bytes(_)) => true,
            (Self::List(item), Value::List(items)) => items.iter().all(|v| item.accepts(v)),
            (Self::Unknown, _) => true,
            _ => false,
        }
    }

    /// Converts `value` to this type, widening or narrowing integers.
    pub fn cast(&self, value: Value) -> Result<Value> {
        match (self, value) {
            (Self::I32, value @ Value::I64(_)) => Ok(Value::I32(i32::try_from(value)?)),
            (Self::I64, Value::I32(v)) => Ok(Value::I64(v.into())),
            (ty, value) if ty.accepts(&value) => Ok(value),
            (ty, value) => Err(Error::type_conversion(value, ty.name())),
        }
    }

    /// Short name, as accepted by [`Type::from_name`].
    pub fn name(&self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::String => "string",
            Self::Bytes => "bytes",
            Self::Model(_) => "model",
            Self::List(_) => "list",
            Self::Unknown => "unknown",
        }
    }
}
