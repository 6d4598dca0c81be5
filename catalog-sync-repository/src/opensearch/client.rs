//! OpenSearch client implementation.
//!
//! This module provides the concrete implementation of `SearchIndexProvider`
//! using the OpenSearch Rust client.

use async_trait::async_trait;
use opensearch::{
    cluster::ClusterHealthParts,
    http::request::JsonBody,
    http::transport::{SingleNodeConnectionPool, TransportBuilder},
    indices::{IndicesCreateParts, IndicesExistsParts},
    BulkParts, GetParts, OpenSearch, SearchParts,
};
use serde_json::{json, Value};
use tracing::{debug, error, info, instrument};
use url::Url;

use crate::errors::SearchIndexError;
use crate::interfaces::SearchIndexProvider;
use crate::types::{BulkResponse, SearchRequest};
use catalog_sync_shared::SearchDocument;

/// OpenSearch client implementation.
///
/// # Example
///
/// ```ignore
/// let client = OpenSearchClient::new("http://localhost:9200").await?;
/// client.ensure_index("movies", &get_index_settings(EntityKind::Film)).await?;
/// let response = client.bulk_upsert("movies", &documents).await?;
/// ```
pub struct OpenSearchClient {
    client: OpenSearch,
}

impl OpenSearchClient {
    /// Create a new OpenSearch client connected to the specified URL.
    ///
    /// # Arguments
    ///
    /// * `url` - The OpenSearch server URL (e.g., "http://localhost:9200")
    ///
    /// # Returns
    ///
    /// * `Ok(OpenSearchClient)` - A new client instance
    /// * `Err(SearchIndexError)` - If connection setup fails
    pub async fn new(url: &str) -> Result<Self, SearchIndexError> {
        let parsed_url =
            Url::parse(url).map_err(|e| SearchIndexError::connection(e.to_string()))?;

        let conn_pool = SingleNodeConnectionPool::new(parsed_url);
        let transport = TransportBuilder::new(conn_pool)
            .disable_proxy()
            .build()
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        let client = OpenSearch::new(transport);

        info!(url = %url, "Created OpenSearch client");

        Ok(Self { client })
    }

    /// Build the interleaved action/body lines of a bulk request.
    ///
    /// The `index` action replaces a document with the same `_id`, which is
    /// what makes re-delivery of a batch safe.
    fn bulk_body(documents: &[SearchDocument]) -> Result<Vec<JsonBody<Value>>, SearchIndexError> {
        let mut body: Vec<JsonBody<Value>> = Vec::with_capacity(documents.len() * 2);
        for doc in documents {
            let source = doc
                .to_body()
                .map_err(|e| SearchIndexError::serialization(format!("{}: {}", doc.id(), e)))?;
            body.push(json!({ "index": { "_id": doc.id() } }).into());
            body.push(source.into());
        }
        Ok(body)
    }

    /// Extract `_source` of every hit from a search response.
    fn parse_hits(body: &Value) -> Result<Vec<Value>, SearchIndexError> {
        let hits = body["hits"]["hits"]
            .as_array()
            .ok_or_else(|| SearchIndexError::parse("Search response has no hits array"))?;

        Ok(hits
            .iter()
            .filter_map(|hit| hit.get("_source").cloned())
            .collect())
    }
}

#[async_trait]
impl SearchIndexProvider for OpenSearchClient {
    #[instrument(skip(self, documents), fields(index = %index, count = documents.len()))]
    async fn bulk_upsert(
        &self,
        index: &str,
        documents: &[SearchDocument],
    ) -> Result<BulkResponse, SearchIndexError> {
        let body = Self::bulk_body(documents)?;

        let response = self
            .client
            .bulk(BulkParts::Index(index))
            .body(body)
            .send()
            .await
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, "Bulk request failed");
            return Err(SearchIndexError::bulk_operation(status.as_u16(), error_body));
        }

        let raw: Value = response
            .json()
            .await
            .map_err(|e| SearchIndexError::parse(e.to_string()))?;
        debug!(response = %raw, "Bulk response");

        let parsed = BulkResponse::from_json(&raw)
            .ok_or_else(|| SearchIndexError::parse("Unexpected bulk response shape"))?;

        info!(
            took_ms = parsed.took_ms,
            errors = parsed.errors,
            items = parsed.items.len(),
            "Bulk request completed"
        );
        Ok(parsed)
    }

    async fn get_document(&self, index: &str, id: &str) -> Result<Option<Value>, SearchIndexError> {
        let response = self
            .client
            .get(GetParts::IndexId(index, id))
            .send()
            .await
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        let status = response.status_code();
        if status.as_u16() == 404 {
            return Ok(None);
        }
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(SearchIndexError::query(format!(
                "Get failed with status {}: {}",
                status, error_body
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| SearchIndexError::parse(e.to_string()))?;
        Ok(body.get("_source").cloned())
    }

    async fn search(
        &self,
        index: &str,
        request: &SearchRequest,
    ) -> Result<Vec<Value>, SearchIndexError> {
        let response = self
            .client
            .search(SearchParts::Index(&[index]))
            .body(request.to_body())
            .send()
            .await
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        let status = response.status_code();
        if status.as_u16() == 404 {
            return Ok(Vec::new());
        }
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, "Search request failed");
            return Err(SearchIndexError::query(format!(
                "Search failed with status {}: {}",
                status, error_body
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| SearchIndexError::parse(e.to_string()))?;
        Self::parse_hits(&body)
    }

    async fn ensure_index(&self, index: &str, settings: &Value) -> Result<(), SearchIndexError> {
        let exists = self
            .client
            .indices()
            .exists(IndicesExistsParts::Index(&[index]))
            .send()
            .await
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        if exists.status_code().is_success() {
            debug!(index = %index, "Index already exists");
            return Ok(());
        }

        let response = self
            .client
            .indices()
            .create(IndicesCreateParts::Index(index))
            .body(settings.clone())
            .send()
            .await
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        let status = response.status_code();
        if status.is_success() {
            info!(index = %index, "Created index");
            return Ok(());
        }

        let error_body = response.text().await.unwrap_or_default();
        // Another process created it between the check and the create.
        if error_body.contains("resource_already_exists_exception") {
            return Ok(());
        }
        Err(SearchIndexError::index_creation(format!(
            "Creating index {} failed with status {}: {}",
            index, status, error_body
        )))
    }

    async fn health_check(&self) -> Result<bool, SearchIndexError> {
        let response = self
            .client
            .cluster()
            .health(ClusterHealthParts::None)
            .send()
            .await
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        let body: Value = response
            .json()
            .await
            .map_err(|e| SearchIndexError::parse(e.to_string()))?;

        let status = body["status"].as_str().unwrap_or("red");
        Ok(status == "green" || status == "yellow")
    }
}
