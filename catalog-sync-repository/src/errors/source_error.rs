//! Source reader error types.

use thiserror::Error;

/// Errors that can occur while reading changed rows from the relational source.
#[derive(Debug, Clone, Error)]
pub enum SourceError {
    /// The connection could not be established or was dropped.
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The query was rejected by the source.
    #[error("Query error: {0}")]
    QueryError(String),

    /// A returned row could not be decoded into a raw record.
    #[error("Decode error: {0}")]
    DecodeError(String),

    /// Transient failures persisted past the retry budget.
    #[error("Source unavailable after {attempts} attempts: {last}")]
    Exhausted { attempts: u32, last: String },
}

impl SourceError {
    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::ConnectionError(msg.into())
    }

    /// Create a query error.
    pub fn query(msg: impl Into<String>) -> Self {
        Self::QueryError(msg.into())
    }

    /// Create a decode error.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::DecodeError(msg.into())
    }

    /// Whether the failure is a dropped or refused connection worth retrying.
    pub fn is_transient(&self) -> bool {
        matches!(self, SourceError::ConnectionError(_))
    }
}
