//! # Catalog Sync Pipeline
//!
//! This crate provides the pipeline components that keep the search index
//! in step with the relational catalog.
//!
//! ## Architecture
//!
//! The pipeline follows the Extract-Transform-Load pattern:
//!
//! 1. **Processor**: Validates raw source rows and shapes them into search documents
//! 2. **Loader**: Bulk-upserts documents into OpenSearch
//! 3. **Orchestrator**: Drives each sync task batch by batch and advances its checkpoint

pub mod errors;
pub mod loader;
pub mod orchestrator;
pub mod processor;

pub use catalog_sync_repository::RetryPolicy;
pub use errors::PipelineError;
pub use loader::{BulkIndexer, LoadOutcome, LoaderConfig};
pub use orchestrator::{Orchestrator, OrchestratorConfig, SyncState, SyncTask, TaskReport};
pub use processor::{Mapping, ProcessedBatch, RecordProcessor};
