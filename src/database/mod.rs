pub mod manager;
pub mod models;
pub mod query_builder;

pub use manager::{Database, DatabaseError};
pub use query_builder::{sql_for_partial_update, PartialUpdate, SqlBuildError, SqlValue};
