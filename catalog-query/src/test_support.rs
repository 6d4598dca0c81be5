//! Fakes shared by the service tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;

use catalog_sync_repository::{
    BulkResponse, Cache, CacheError, SearchIndexError, SearchIndexProvider, SearchRequest,
};
use catalog_sync_shared::SearchDocument;

/// Search index with fixed documents; every search returns all of them.
#[derive(Default)]
pub struct FakeIndex {
    pub documents: HashMap<String, Value>,
    pub gets: AtomicUsize,
    pub searches: AtomicUsize,
    pub last_request: Mutex<Option<SearchRequest>>,
}

impl FakeIndex {
    pub fn with(documents: Vec<Value>) -> Self {
        Self {
            documents: documents
                .into_iter()
                .map(|doc| (doc["id"].as_str().unwrap_or_default().to_string(), doc))
                .collect(),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.gets.load(Ordering::SeqCst) + self.searches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SearchIndexProvider for FakeIndex {
    async fn bulk_upsert(
        &self,
        _index: &str,
        _documents: &[SearchDocument],
    ) -> Result<BulkResponse, SearchIndexError> {
        Err(SearchIndexError::bulk_operation(405, "read-only fake"))
    }

    async fn get_document(&self, _index: &str, id: &str) -> Result<Option<Value>, SearchIndexError> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        Ok(self.documents.get(id).cloned())
    }

    async fn search(&self, _index: &str, request: &SearchRequest) -> Result<Vec<Value>, SearchIndexError> {
        self.searches.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().await = Some(request.clone());
        let mut hits: Vec<Value> = self.documents.values().cloned().collect();
        hits.sort_by(|a, b| a["id"].as_str().cmp(&b["id"].as_str()));
        Ok(hits.into_iter().skip(request.from).take(request.size).collect())
    }

    async fn ensure_index(&self, _index: &str, _settings: &Value) -> Result<(), SearchIndexError> {
        Ok(())
    }

    async fn health_check(&self) -> Result<bool, SearchIndexError> {
        Ok(true)
    }
}

/// Cache whose every call fails.
pub struct BrokenCache;

#[async_trait]
impl Cache for BrokenCache {
    async fn get(&self, _key: &str) -> Result<Option<Value>, CacheError> {
        Err(CacheError::connection("connection refused"))
    }

    async fn set(&self, _key: &str, _value: &Value, _ttl: Duration) -> Result<(), CacheError> {
        Err(CacheError::connection("connection refused"))
    }
}
