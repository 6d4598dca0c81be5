//! Source reader trait definition.

use async_trait::async_trait;

use crate::errors::SourceError;
use crate::source::QueryDefinition;
use crate::types::FetchParams;
use catalog_sync_shared::RawRow;

/// Reads bounded batches of changed rows from the relational source.
#[async_trait]
pub trait SourceReader: Send + Sync {
    /// Execute `query` for rows with `modified > params.dttm`.
    ///
    /// Returns at most `params.page_size` rows ordered by `modified`
    /// ascending. An empty batch means no more rows satisfy the predicate.
    /// Implementations retry transient connection failures by re-running the
    /// full bounded query.
    async fn fetch(
        &self,
        query: &QueryDefinition,
        params: FetchParams,
    ) -> Result<Vec<RawRow>, SourceError>;
}
