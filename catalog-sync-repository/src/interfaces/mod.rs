//! Interface definitions for the external boundaries of the pipeline.
//!
//! Each boundary is an abstract trait so that backends can be swapped and
//! mocked: the relational source, the checkpoint store, the search index and
//! the read-path cache.

mod cache;
mod checkpoint_store;
mod search_index_provider;
mod source_reader;

pub use cache::Cache;
pub use checkpoint_store::CheckpointStore;
pub use search_index_provider::SearchIndexProvider;
pub use source_reader::SourceReader;
