//! Error types for the query services.

use catalog_sync_repository::{CacheError, SearchIndexError};
use thiserror::Error;

/// Errors returned by the query services.
#[derive(Error, Debug)]
pub enum QueryError {
    /// The entity does not exist or the result set is empty.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The request parameters are out of range.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The search index failed.
    #[error("Search error: {0}")]
    SearchError(#[from] SearchIndexError),

    /// The cache failed. Services log and bypass these; callers of the
    /// cache helpers see them.
    #[error("Cache error: {0}")]
    CacheError(#[from] CacheError),
}

impl QueryError {
    /// Create a not found error.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create an invalid request error.
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidRequest(msg.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
