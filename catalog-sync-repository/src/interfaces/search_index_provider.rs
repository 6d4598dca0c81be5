//! Search index provider trait definition.
//!
//! This module defines the abstract interface for search index operations,
//! allowing for different backend implementations (OpenSearch, Elasticsearch, etc.).

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::SearchIndexError;
use crate::types::{BulkResponse, SearchRequest};
use catalog_sync_shared::SearchDocument;

/// Abstracts the underlying search index implementation (OpenSearch, Elasticsearch, etc.).
///
/// This trait defines the interface for all search index backend implementations. The
/// pipeline uses the write side (`bulk_upsert`, `ensure_index`), the query services use
/// the read side (`get_document`, `search`).
///
/// All methods return `Result<T, SearchIndexError>` for consistent error handling across
/// different backend implementations.
#[async_trait]
pub trait SearchIndexProvider: Send + Sync {
    /// Insert or replace documents in a single bulk request.
    ///
    /// Each document is addressed by its id, so delivering the same document
    /// twice overwrites it instead of creating a duplicate.
    ///
    /// # Arguments
    ///
    /// * `index` - Target index name
    /// * `documents` - Documents to upsert
    ///
    /// # Returns
    ///
    /// * `Ok(BulkResponse)` - The engine accepted the request; per-item failures are
    ///   reported inside the response
    /// * `Err(SearchIndexError)` - The request failed as a whole (e.g. connection refused)
    async fn bulk_upsert(
        &self,
        index: &str,
        documents: &[SearchDocument],
    ) -> Result<BulkResponse, SearchIndexError>;

    /// Fetch the source of a document by id.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(Value))` - The stored document body
    /// * `Ok(None)` - No document (or no index) with that id
    /// * `Err(SearchIndexError)` - If the lookup fails
    async fn get_document(&self, index: &str, id: &str) -> Result<Option<Value>, SearchIndexError>;

    /// Run a search request and return the sources of the hits, in rank order.
    ///
    /// A missing index yields an empty hit list.
    async fn search(
        &self,
        index: &str,
        request: &SearchRequest,
    ) -> Result<Vec<Value>, SearchIndexError>;

    /// Create the index with the given settings and mappings if it doesn't exist.
    ///
    /// This should be called during application startup.
    async fn ensure_index(&self, index: &str, settings: &Value) -> Result<(), SearchIndexError>;

    /// Check if the search engine is healthy and reachable.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - If the search engine is healthy
    /// * `Ok(false)` - If the search engine is unhealthy
    /// * `Err(SearchIndexError)` - If the health check fails to execute
    async fn health_check(&self) -> Result<bool, SearchIndexError>;
}
