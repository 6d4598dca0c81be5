//! Read-through caching shared by the services.

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::QueryError;
use catalog_sync_repository::opensearch::queries::{Page, MAX_RESULT_WINDOW};
use catalog_sync_repository::{Cache, SearchIndexError, SearchIndexProvider, SearchRequest};

/// Time a cached answer stays valid.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(5 * 60);

/// Configuration shared by the query services.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub cache_ttl: Duration,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            cache_ttl: DEFAULT_CACHE_TTL,
        }
    }
}

/// Cache-then-index lookups against one index.
#[derive(Clone)]
pub(crate) struct ReadThrough {
    search: Arc<dyn SearchIndexProvider>,
    cache: Arc<dyn Cache>,
    index: String,
    config: ServiceConfig,
}

impl ReadThrough {
    pub(crate) fn new(
        search: Arc<dyn SearchIndexProvider>,
        cache: Arc<dyn Cache>,
        index: impl Into<String>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            search,
            cache,
            index: index.into(),
            config,
        }
    }

    pub(crate) fn index(&self) -> &str {
        &self.index
    }

    /// One document by id, cached under `key`.
    pub(crate) async fn get_one<T>(&self, key: &str, id: &str) -> Result<T, QueryError>
    where
        T: DeserializeOwned + Serialize,
    {
        if let Some(hit) = self.cached::<T>(key).await {
            return Ok(hit);
        }

        let source = self
            .search
            .get_document(&self.index, id)
            .await?
            .ok_or_else(|| QueryError::not_found(format!("{} {}", self.index, id)))?;
        let document: T = decode(source)?;

        self.store(key, &document).await;
        Ok(document)
    }

    /// The hits of `request`, cached under `key`. An empty page is not found
    /// and is not cached.
    pub(crate) async fn get_many<T>(&self, key: &str, request: &SearchRequest) -> Result<Vec<T>, QueryError>
    where
        T: DeserializeOwned + Serialize,
    {
        if let Some(hit) = self.cached::<Vec<T>>(key).await {
            return Ok(hit);
        }

        let hits = self.search.search(&self.index, request).await?;
        if hits.is_empty() {
            return Err(QueryError::not_found(format!("no {} for {}", self.index, key)));
        }
        let documents = hits.into_iter().map(decode).collect::<Result<Vec<T>, _>>()?;

        self.store(key, &documents).await;
        Ok(documents)
    }

    async fn cached<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.cache.get(key).await {
            Ok(Some(value)) => match serde_json::from_value(value) {
                Ok(decoded) => {
                    debug!(key, "Cache hit");
                    Some(decoded)
                }
                Err(e) => {
                    warn!(key, error = %e, "Ignoring undecodable cache entry");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!(key, error = %e, "Cache read failed, querying index");
                None
            }
        }
    }

    async fn store<T: Serialize>(&self, key: &str, value: &T) {
        let value = match serde_json::to_value(value) {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "Result not cacheable");
                return;
            }
        };
        if let Err(e) = self.cache.set(key, &value, self.config.cache_ttl).await {
            warn!(key, error = %e, "Cache write failed");
        }
    }
}

fn decode<T: DeserializeOwned>(source: Value) -> Result<T, QueryError> {
    serde_json::from_value(source)
        .map_err(|e| QueryError::SearchError(SearchIndexError::parse(format!("Unexpected document shape: {}", e))))
}

/// Reject pages below 1, with no room for hits, or past the result window.
pub(crate) fn validate_page(page: Page) -> Result<Page, QueryError> {
    if page.number < 1 || page.size < 1 {
        return Err(QueryError::invalid(format!(
            "page number and size must be at least 1, got {} and {}",
            page.number, page.size
        )));
    }
    if !page.within_result_window() {
        return Err(QueryError::invalid(format!(
            "page {} of size {} is beyond the first {} results",
            page.number, page.size, MAX_RESULT_WINDOW
        )));
    }
    Ok(page)
}
