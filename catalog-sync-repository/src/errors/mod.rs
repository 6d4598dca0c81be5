//! Error types for the catalog sync repository.

mod cache_error;
mod checkpoint_error;
mod search_index_error;
mod source_error;

pub use cache_error::CacheError;
pub use checkpoint_error::CheckpointError;
pub use search_index_error::SearchIndexError;
pub use source_error::SourceError;
