//! Value model moved through member accessors.

mod ty;
pub use ty::Type;

mod value;
pub use value::Value;
