//! # Catalog Sync Repository
//!
//! Boundaries of the catalog sync pipeline: the relational source reader,
//! checkpoint stores, the OpenSearch index provider and the read-path cache.
//! Each boundary is a trait in [`interfaces`] with one or more concrete
//! implementations next to it.

pub mod cache;
pub mod checkpoint;
pub mod errors;
pub mod interfaces;
pub mod opensearch;
pub mod retry;
pub mod source;
pub mod types;

pub use cache::{cache_key, InMemoryCache, RedisCache};
pub use checkpoint::{JsonFileStore, MemoryStore};
pub use errors::{CacheError, CheckpointError, SearchIndexError, SourceError};
pub use interfaces::{Cache, CheckpointStore, SearchIndexProvider, SourceReader};
pub use opensearch::{get_index_settings, OpenSearchClient};
pub use retry::{RetryError, RetryPolicy};
pub use source::{PostgresReader, PostgresReaderConfig, QueryDefinition};
pub use types::{BulkItemResult, BulkResponse, FetchParams, SearchRequest, SortSpec};
