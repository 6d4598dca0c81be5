//! Orchestrator module for the catalog sync pipeline.
//!
//! Drives sync tasks batch by batch: fetch rows changed since the task's
//! checkpoint, extract and transform them, bulk-load the documents and only
//! then advance the checkpoint.

mod task;

pub use task::{SyncState, SyncTask, TaskReport};

use std::sync::Arc;

use chrono::{DateTime, FixedOffset};
use futures::future::join_all;
use tokio::sync::watch;
use tracing::{debug, error, info, instrument, warn};

use crate::errors::PipelineError;
use crate::loader::BulkIndexer;
use crate::processor::RecordProcessor;
use catalog_sync_repository::checkpoint::encode_checkpoint;
use catalog_sync_repository::{get_index_settings, CheckpointStore, FetchParams, SearchIndexError, SourceReader};
use catalog_sync_shared::checkpoint_floor;

/// Configuration for the orchestrator.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Maximum number of rows fetched per batch.
    pub page_size: usize,
    /// Run tasks concurrently instead of one after another.
    pub concurrent: bool,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            page_size: 100,
            concurrent: false,
        }
    }
}

/// Orchestrator that coordinates the pipeline components.
///
/// Tasks share the source reader, the checkpoint store and the indexer but
/// no mutable state: each task owns its checkpoint key and target index.
/// Cloning is cheap and yields a handle to the same components and the same
/// shutdown signal.
#[derive(Clone)]
pub struct Orchestrator {
    source: Arc<dyn SourceReader>,
    checkpoints: Arc<dyn CheckpointStore>,
    indexer: BulkIndexer,
    config: OrchestratorConfig,
    shutdown_tx: Arc<watch::Sender<bool>>,
    shutdown_rx: watch::Receiver<bool>,
}

impl Orchestrator {
    /// Create a new orchestrator with the given components.
    pub fn new(
        source: Arc<dyn SourceReader>,
        checkpoints: Arc<dyn CheckpointStore>,
        indexer: BulkIndexer,
    ) -> Self {
        Self::with_config(source, checkpoints, indexer, OrchestratorConfig::default())
    }

    /// Create a new orchestrator with custom configuration.
    pub fn with_config(
        source: Arc<dyn SourceReader>,
        checkpoints: Arc<dyn CheckpointStore>,
        indexer: BulkIndexer,
        config: OrchestratorConfig,
    ) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        Self {
            source,
            checkpoints,
            indexer,
            config,
            shutdown_tx: Arc::new(shutdown_tx),
            shutdown_rx,
        }
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Trigger a graceful shutdown.
    ///
    /// Running tasks finish their in-flight batch and stop before the next
    /// fetch.
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
    }

    pub fn is_shutdown_requested(&self) -> bool {
        *self.shutdown_rx.borrow()
    }

    /// A receiver that observes the shutdown signal.
    pub fn subscribe_shutdown(&self) -> watch::Receiver<bool> {
        self.shutdown_tx.subscribe()
    }

    /// Check the search engine and create every task's index if missing.
    #[instrument(skip(self, tasks), fields(task_count = tasks.len()))]
    pub async fn prepare(&self, tasks: &[SyncTask]) -> Result<(), SearchIndexError> {
        if !self.indexer.health_check().await? {
            return Err(SearchIndexError::connection("Search engine cluster is not healthy"));
        }

        for task in tasks {
            self.indexer
                .ensure_index(&task.index, &get_index_settings(task.kind))
                .await?;
        }
        info!("Search indices ready");
        Ok(())
    }

    /// Run every task once, sequentially or concurrently depending on the
    /// configuration. One report per task, in task order.
    pub async fn run_all(&self, tasks: &[SyncTask]) -> Vec<TaskReport> {
        if !self.config.concurrent {
            let mut reports = Vec::with_capacity(tasks.len());
            for task in tasks {
                reports.push(self.run_task(task).await);
            }
            return reports;
        }

        let handles = tasks.iter().cloned().map(|task| {
            let this = self.clone();
            tokio::spawn(async move { this.run_task(&task).await })
        });

        join_all(handles)
            .await
            .into_iter()
            .zip(tasks)
            .map(|(joined, task)| {
                joined.unwrap_or_else(|e| {
                    error!(task = %task.name, error = %e, "Sync task aborted");
                    let mut report = TaskReport::new(&task.name);
                    report.final_state = SyncState::Failed;
                    report.error = Some(PipelineError::aborted(e.to_string()));
                    report
                })
            })
            .collect()
    }

    /// Run one task until the source is drained or a batch fails.
    ///
    /// Never returns an error: failures end the run in [`SyncState::Failed`]
    /// and are carried in the report. The checkpoint in the report is the one
    /// persisted when the run ended.
    #[instrument(skip(self, task), fields(task = %task.name, index = %task.index))]
    pub async fn run_task(&self, task: &SyncTask) -> TaskReport {
        let mut run = TaskRun::new(task);
        let floor = checkpoint_floor();
        let mut cursor = self.checkpoints.get(&task.checkpoint_key, floor).await;
        if cursor != floor {
            run.report.checkpoint = Some(encode_checkpoint(cursor));
        }
        info!(checkpoint = %cursor, "Starting sync task");

        loop {
            match self.run_batch(task, &mut run, cursor).await {
                Ok(Some(next)) => cursor = next,
                Ok(None) => {
                    run.advance(SyncState::Drained);
                    info!(
                        batches = run.report.batches,
                        documents = run.report.documents,
                        "Sync task drained"
                    );
                    break;
                }
                Err(e) => {
                    run.advance(SyncState::Failed);
                    if matches!(e, PipelineError::Cancelled) {
                        warn!(batches = run.report.batches, "Sync task stopped by shutdown");
                    } else {
                        error!(error = %e, batches = run.report.batches, "Sync task failed");
                    }
                    run.report.error = Some(e);
                    break;
                }
            }
        }

        run.report.final_state = run.state;
        run.report
    }

    /// Process the next batch after `cursor`.
    ///
    /// Returns the new checkpoint, or `None` once the source has no rows
    /// newer than `cursor`.
    async fn run_batch(
        &self,
        task: &SyncTask,
        run: &mut TaskRun,
        cursor: DateTime<FixedOffset>,
    ) -> Result<Option<DateTime<FixedOffset>>, PipelineError> {
        if self.is_shutdown_requested() {
            return Err(PipelineError::Cancelled);
        }

        run.advance(SyncState::Fetching);
        let page_size = self.config.page_size;
        let rows = self
            .source
            .fetch(&task.query, FetchParams::new(cursor, page_size))
            .await?;
        if rows.is_empty() {
            return Ok(None);
        }
        run.report.batches += 1;

        run.advance(SyncState::Transforming);
        let batch = run.processor.process_batch(&rows)?;
        if rows.len() >= page_size && batch.ends_in_tie {
            if let Some(tied) = batch.last_modified {
                warn!(
                    modified = %tied,
                    "Batch ends with rows sharing the same modified timestamp; \
                     rows with this timestamp beyond the page boundary are skipped unless ordered by id"
                );
            }
        }

        run.advance(SyncState::Loading);
        let outcome = self.indexer.load(&batch.documents, &task.index).await;
        if !outcome.is_success() {
            return Err(PipelineError::index_load(outcome.describe()));
        }

        run.advance(SyncState::Checkpointing);
        let next = batch.max_modified.map_or(cursor, |max| max.max(cursor));
        self.checkpoints.set(&task.checkpoint_key, next).await?;

        run.report.documents += batch.documents.len();
        run.report.checkpoint = Some(encode_checkpoint(next));
        debug!(
            rows = rows.len(),
            checkpoint = %next,
            "Batch indexed and checkpoint advanced"
        );
        Ok(Some(next))
    }
}

/// State of one task run.
struct TaskRun {
    processor: RecordProcessor,
    state: SyncState,
    report: TaskReport,
}

impl TaskRun {
    fn new(task: &SyncTask) -> Self {
        Self {
            processor: RecordProcessor::new(task.kind),
            state: SyncState::Idle,
            report: TaskReport::new(&task.name),
        }
    }

    fn advance(&mut self, next: SyncState) {
        if !self.state.can_transition_to(next) {
            warn!(from = ?self.state, to = ?next, "Unexpected sync state transition");
        }
        debug!(from = ?self.state, to = ?next, "Sync state transition");
        self.state = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::LoaderConfig;
    use async_trait::async_trait;
    use catalog_sync_repository::{
        BulkItemResult, BulkResponse, CheckpointError, MemoryStore, QueryDefinition, RetryPolicy,
        SearchRequest, SourceError,
    };
    use catalog_sync_shared::{EntityKind, RawRow, SearchDocument};
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Mutex;

    /// Mock source serving genre rows newer than the requested timestamp.
    struct MockSource {
        rows: Vec<RawRow>,
        fetches: AtomicUsize,
    }

    impl MockSource {
        fn with_genres(count: usize) -> Self {
            let rows = (0..count)
                .map(|i| {
                    let value = json!({
                        "id": format!("00000000-0000-4000-8000-{:012}", i),
                        "name": format!("Genre {}", i),
                        "description": null,
                        "created": "2021-01-01T00:00:00+00:00",
                        "modified": format!("2021-01-01T00:{:02}:{:02}+00:00", i / 60, i % 60)
                    });
                    match value {
                        Value::Object(map) => map,
                        _ => unreachable!(),
                    }
                })
                .collect();
            Self {
                rows,
                fetches: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl SourceReader for MockSource {
        async fn fetch(&self, _query: &QueryDefinition, params: FetchParams) -> Result<Vec<RawRow>, SourceError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            Ok(self
                .rows
                .iter()
                .filter(|row| {
                    let modified = row["modified"].as_str().unwrap_or_default();
                    DateTime::parse_from_rfc3339(modified).map_or(false, |m| m > params.dttm)
                })
                .take(params.page_size)
                .cloned()
                .collect())
        }
    }

    #[derive(Clone, Copy, PartialEq)]
    enum IndexMode {
        Accept,
        /// The whole bulk request fails.
        FailRequest,
        /// The request succeeds but the first item is rejected.
        RejectFirstItem,
    }

    /// Mock index that records bulk requests.
    struct MockIndex {
        mode: IndexMode,
        bulk_calls: AtomicUsize,
        documents: Mutex<Vec<String>>,
    }

    impl MockIndex {
        fn new(fail: bool) -> Self {
            Self::with_mode(if fail { IndexMode::FailRequest } else { IndexMode::Accept })
        }

        fn with_mode(mode: IndexMode) -> Self {
            Self {
                mode,
                bulk_calls: AtomicUsize::new(0),
                documents: Mutex::new(Vec::new()),
            }
        }
    }

    /// Checkpoint store whose writes always fail.
    struct FailingStore;

    #[async_trait]
    impl CheckpointStore for FailingStore {
        async fn get(&self, _key: &str, default: DateTime<FixedOffset>) -> DateTime<FixedOffset> {
            default
        }

        async fn set(&self, _key: &str, _value: DateTime<FixedOffset>) -> Result<(), CheckpointError> {
            Err(CheckpointError::backend("disk full"))
        }
    }

    #[async_trait]
    impl catalog_sync_repository::SearchIndexProvider for MockIndex {
        async fn bulk_upsert(
            &self,
            _index: &str,
            documents: &[SearchDocument],
        ) -> Result<BulkResponse, SearchIndexError> {
            self.bulk_calls.fetch_add(1, Ordering::SeqCst);
            if self.mode == IndexMode::FailRequest {
                return Err(SearchIndexError::bulk_operation(400, "mapper_parsing_exception"));
            }
            let mut stored = self.documents.lock().await;
            let items: Vec<BulkItemResult> = documents
                .iter()
                .enumerate()
                .map(|(i, doc)| {
                    if i == 0 && self.mode == IndexMode::RejectFirstItem {
                        return BulkItemResult {
                            id: doc.id().to_string(),
                            status: 400,
                            error: Some("mapper_parsing_exception".to_string()),
                        };
                    }
                    stored.push(doc.id().to_string());
                    BulkItemResult {
                        id: doc.id().to_string(),
                        status: 201,
                        error: None,
                    }
                })
                .collect();
            Ok(BulkResponse {
                took_ms: 1,
                errors: items.iter().any(|item| !item.is_success()),
                items,
            })
        }

        async fn get_document(&self, _index: &str, _id: &str) -> Result<Option<Value>, SearchIndexError> {
            Ok(None)
        }

        async fn search(&self, _index: &str, _request: &SearchRequest) -> Result<Vec<Value>, SearchIndexError> {
            Ok(Vec::new())
        }

        async fn ensure_index(&self, _index: &str, _settings: &Value) -> Result<(), SearchIndexError> {
            Ok(())
        }

        async fn health_check(&self) -> Result<bool, SearchIndexError> {
            Ok(true)
        }
    }

    fn orchestrator(
        source: Arc<MockSource>,
        index: Arc<MockIndex>,
        store: Arc<dyn CheckpointStore>,
        page_size: usize,
    ) -> Orchestrator {
        let indexer = BulkIndexer::with_config(
            index,
            LoaderConfig {
                retry: RetryPolicy::no_retry(),
            },
        );
        Orchestrator::with_config(
            source,
            store,
            indexer,
            OrchestratorConfig {
                page_size,
                concurrent: false,
            },
        )
    }

    #[tokio::test]
    async fn test_run_task_drains_source() {
        let source = Arc::new(MockSource::with_genres(25));
        let index = Arc::new(MockIndex::new(false));
        let store = Arc::new(MemoryStore::default());
        let orchestrator = orchestrator(source.clone(), index.clone(), store.clone(), 10);
        let task = SyncTask::for_kind(EntityKind::Genre);

        let report = orchestrator.run_task(&task).await;

        assert_eq!(report.final_state, SyncState::Drained);
        assert!(report.error.is_none());
        assert_eq!(report.batches, 3);
        assert_eq!(report.documents, 25);
        // Three non-empty batches and the final empty fetch.
        assert_eq!(source.fetches.load(Ordering::SeqCst), 4);
        assert_eq!(report.checkpoint.as_deref(), Some("2021-01-01T00:00:24+00:00"));
        assert_eq!(
            store.raw("genre_modified").await.as_deref(),
            Some("2021-01-01T00:00:24+00:00")
        );
    }

    #[tokio::test]
    async fn test_failed_load_keeps_checkpoint() {
        let source = Arc::new(MockSource::with_genres(5));
        let index = Arc::new(MockIndex::new(true));
        let store = Arc::new(MemoryStore::default());
        let orchestrator = orchestrator(source, index.clone(), store.clone(), 10);

        let report = orchestrator.run_task(&SyncTask::for_kind(EntityKind::Genre)).await;

        assert_eq!(report.final_state, SyncState::Failed);
        assert!(matches!(report.error, Some(PipelineError::IndexLoadError(_))));
        assert_eq!(index.bulk_calls.load(Ordering::SeqCst), 1);
        assert!(report.checkpoint.is_none());
        assert!(store.raw("genre_modified").await.is_none());
    }

    #[tokio::test]
    async fn test_partial_load_keeps_checkpoint() {
        let source = Arc::new(MockSource::with_genres(5));
        let index = Arc::new(MockIndex::with_mode(IndexMode::RejectFirstItem));
        let store = Arc::new(MemoryStore::default());
        let orchestrator = orchestrator(source.clone(), index.clone(), store.clone(), 10);

        let report = orchestrator.run_task(&SyncTask::for_kind(EntityKind::Genre)).await;

        assert_eq!(report.final_state, SyncState::Failed);
        assert!(matches!(report.error, Some(PipelineError::IndexLoadError(_))));
        // The other four documents reached the index, the checkpoint did not move.
        assert_eq!(index.documents.lock().await.len(), 4);
        assert_eq!(report.documents, 0);
        assert!(report.checkpoint.is_none());
        assert!(store.raw("genre_modified").await.is_none());
        assert_eq!(source.fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_checkpoint_write_failure_fails_task() {
        let source = Arc::new(MockSource::with_genres(5));
        let index = Arc::new(MockIndex::new(false));
        let orchestrator = orchestrator(source.clone(), index.clone(), Arc::new(FailingStore), 10);

        let report = orchestrator.run_task(&SyncTask::for_kind(EntityKind::Genre)).await;

        assert_eq!(report.final_state, SyncState::Failed);
        assert!(matches!(report.error, Some(PipelineError::CheckpointError(_))));
        assert_eq!(report.documents, 0);
        assert!(report.checkpoint.is_none());
        assert_eq!(index.bulk_calls.load(Ordering::SeqCst), 1);
        // No further batch is fetched after the failed advance.
        assert_eq!(source.fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_shutdown_stops_before_next_batch() {
        let source = Arc::new(MockSource::with_genres(30));
        let index = Arc::new(MockIndex::new(false));
        let store = Arc::new(MemoryStore::default());
        let orchestrator = orchestrator(source.clone(), index, store, 10);

        orchestrator.shutdown();
        let report = orchestrator.run_task(&SyncTask::for_kind(EntityKind::Genre)).await;

        assert_eq!(report.final_state, SyncState::Failed);
        assert!(matches!(report.error, Some(PipelineError::Cancelled)));
        assert_eq!(source.fetches.load(Ordering::SeqCst), 0);
        assert!(orchestrator.is_shutdown_requested());
    }

    #[tokio::test]
    async fn test_run_all_concurrent_reports_in_task_order() {
        let source = Arc::new(MockSource::with_genres(3));
        let index = Arc::new(MockIndex::new(false));
        let store = Arc::new(MemoryStore::default());
        let indexer = BulkIndexer::new(index);
        let orchestrator = Orchestrator::with_config(
            source,
            store.clone(),
            indexer,
            OrchestratorConfig {
                page_size: 2,
                concurrent: true,
            },
        );
        let tasks = vec![
            SyncTask::for_kind(EntityKind::Genre),
            SyncTask::new(
                "genre_copy",
                EntityKind::Genre,
                "genre_copy_modified",
                "genres_copy",
                QueryDefinition::builtin(EntityKind::Genre),
            ),
        ];

        let reports = orchestrator.run_all(&tasks).await;

        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].task, "genre");
        assert_eq!(reports[1].task, "genre_copy");
        assert!(reports.iter().all(|r| r.final_state == SyncState::Drained));
        assert!(store.raw("genre_modified").await.is_some());
        assert!(store.raw("genre_copy_modified").await.is_some());
    }

    #[tokio::test]
    async fn test_prepare_ensures_indices() {
        let source = Arc::new(MockSource::with_genres(0));
        let index = Arc::new(MockIndex::new(false));
        let store = Arc::new(MemoryStore::default());
        let orchestrator = orchestrator(source, index, store, 10);

        let tasks: Vec<SyncTask> = EntityKind::ALL.iter().map(|k| SyncTask::for_kind(*k)).collect();
        assert!(orchestrator.prepare(&tasks).await.is_ok());
    }
}
