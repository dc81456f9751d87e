mod error;
pub use error::Error;

pub mod schema;
pub use schema::Catalog;

pub mod stmt;

/// A Result type alias that uses ormeta's [`Error`] type.
pub type Result<T> = core::result::Result<T, Error>;
