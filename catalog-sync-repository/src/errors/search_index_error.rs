//! Search index error types.
//!
//! This module defines the error types that can occur during search index operations.

use thiserror::Error;

/// Errors that can occur during search index operations.
#[derive(Debug, Clone, Error)]
pub enum SearchIndexError {
    /// Failed to establish connection to the search engine.
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Bulk request was rejected as a whole with an HTTP status.
    #[error("Bulk operation failed with status {status}: {message}")]
    BulkOperationError { status: u16, message: String },

    /// Failed to create the search index.
    #[error("Index creation error: {0}")]
    IndexCreationError(String),

    /// Search query execution failed.
    #[error("Query error: {0}")]
    QueryError(String),

    /// Failed to parse response from the search engine.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Failed to serialize a document for the search engine.
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl SearchIndexError {
    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::ConnectionError(msg.into())
    }

    /// Create a bulk operation error for a response with `status`.
    pub fn bulk_operation(status: u16, msg: impl Into<String>) -> Self {
        Self::BulkOperationError {
            status,
            message: msg.into(),
        }
    }

    /// Create an index creation error.
    pub fn index_creation(msg: impl Into<String>) -> Self {
        Self::IndexCreationError(msg.into())
    }

    /// Create a query error.
    pub fn query(msg: impl Into<String>) -> Self {
        Self::QueryError(msg.into())
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }

    /// Create a serialization error.
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::SerializationError(msg.into())
    }

    /// Whether retrying the same request may succeed.
    ///
    /// Connection failures and throttling or unavailability statuses are
    /// transient; everything else reflects the request itself.
    pub fn is_transient(&self) -> bool {
        match self {
            SearchIndexError::ConnectionError(_) => true,
            SearchIndexError::BulkOperationError { status, .. } => {
                matches!(status, 408 | 429 | 502 | 503 | 504)
            }
            SearchIndexError::IndexCreationError(_)
            | SearchIndexError::QueryError(_)
            | SearchIndexError::ParseError(_)
            | SearchIndexError::SerializationError(_) => false,
        }
    }
}
