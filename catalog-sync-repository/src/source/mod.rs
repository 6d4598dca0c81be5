//! Relational source access.
//!
//! Query templates for each entity kind and the PostgreSQL implementation of
//! [`SourceReader`](crate::interfaces::SourceReader).

mod postgres;
mod query;

pub use postgres::{PostgresReader, PostgresReaderConfig};
pub use query::QueryDefinition;
