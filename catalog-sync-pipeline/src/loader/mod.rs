//! Loader module for the catalog sync pipeline.
//!
//! Loads transformed documents into the search index as one bulk upsert per
//! batch and classifies the outcome.

use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

use catalog_sync_repository::{BulkItemResult, RetryError, RetryPolicy, SearchIndexError, SearchIndexProvider};
use catalog_sync_shared::SearchDocument;

/// Configuration for the bulk indexer.
#[derive(Debug, Clone, Default)]
pub struct LoaderConfig {
    /// Retry policy for requests that fail as a whole with a transient error.
    pub retry: RetryPolicy,
}

/// Result of loading one batch.
#[derive(Debug)]
pub enum LoadOutcome {
    /// Every document was indexed.
    Success { indexed: usize },
    /// The request went through but some documents were rejected.
    Partial {
        indexed: usize,
        failures: Vec<BulkItemResult>,
    },
    /// Nothing is known to be indexed.
    Failed { error: SearchIndexError },
}

impl LoadOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, LoadOutcome::Success { .. })
    }

    /// Short description of a failed outcome, for error reporting.
    pub fn describe(&self) -> String {
        match self {
            LoadOutcome::Success { indexed } => format!("{} documents indexed", indexed),
            LoadOutcome::Partial { indexed, failures } => {
                let sample: Vec<String> = failures
                    .iter()
                    .take(3)
                    .map(|item| {
                        format!(
                            "{} ({})",
                            item.id,
                            item.error.as_deref().unwrap_or("no reason given")
                        )
                    })
                    .collect();
                format!(
                    "{} documents indexed, {} failed: {}",
                    indexed,
                    failures.len(),
                    sample.join(", ")
                )
            }
            LoadOutcome::Failed { error } => format!("bulk request failed: {}", error),
        }
    }
}

/// Bulk indexer that upserts documents into the search engine.
///
/// Documents are addressed by id, so delivering the same batch again
/// overwrites instead of duplicating. A request that fails as a whole with
/// a transient error is retried in full under the configured policy;
/// partial failures are returned to the caller as they are.
#[derive(Clone)]
pub struct BulkIndexer {
    client: Arc<dyn SearchIndexProvider>,
    config: LoaderConfig,
}

impl BulkIndexer {
    /// Create a new bulk indexer with the given client.
    pub fn new(client: Arc<dyn SearchIndexProvider>) -> Self {
        Self {
            client,
            config: LoaderConfig::default(),
        }
    }

    /// Create a new bulk indexer with custom configuration.
    pub fn with_config(client: Arc<dyn SearchIndexProvider>, config: LoaderConfig) -> Self {
        Self { client, config }
    }

    /// Load a batch of documents into `index`.
    #[instrument(skip(self, documents), fields(index = %index, count = documents.len()))]
    pub async fn load(&self, documents: &[SearchDocument], index: &str) -> LoadOutcome {
        if documents.is_empty() {
            return LoadOutcome::Success { indexed: 0 };
        }

        let result = self
            .config
            .retry
            .run(
                "bulk_upsert",
                |_| self.client.bulk_upsert(index, documents),
                SearchIndexError::is_transient,
            )
            .await;

        let response = match result {
            Ok(response) => response,
            Err(RetryError::Permanent { attempt, error }) => {
                error!(attempt, error = %error, "Bulk upsert failed");
                return LoadOutcome::Failed { error };
            }
            Err(RetryError::Exhausted { attempts, last }) => {
                error!(attempts, error = %last, "Bulk upsert failed after retries");
                return LoadOutcome::Failed { error: last };
            }
        };

        let failures: Vec<BulkItemResult> = response.failures().cloned().collect();
        let indexed = response.succeeded();

        if !response.errors && failures.is_empty() {
            debug!(indexed, "Batch indexed");
            return LoadOutcome::Success { indexed };
        }

        for item in &failures {
            warn!(
                id = %item.id,
                status = item.status,
                reason = item.error.as_deref().unwrap_or(""),
                "Document rejected by search index"
            );
        }
        info!(indexed, failed = failures.len(), "Batch partially indexed");
        LoadOutcome::Partial { indexed, failures }
    }

    /// Create `index` with `settings` when it does not exist yet.
    pub async fn ensure_index(&self, index: &str, settings: &serde_json::Value) -> Result<(), SearchIndexError> {
        self.client.ensure_index(index, settings).await
    }

    /// Check if the search engine is healthy.
    pub async fn health_check(&self) -> Result<bool, SearchIndexError> {
        self.client.health_check().await
    }
}
