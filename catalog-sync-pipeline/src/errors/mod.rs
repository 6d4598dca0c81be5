//! Error types for the catalog sync pipeline.

use catalog_sync_repository::{CheckpointError, SearchIndexError, SourceError};
use thiserror::Error;

/// Errors that can occur while running a sync task.
///
/// Every variant aborts the current task run without advancing its
/// checkpoint, except that a `CheckpointError` is raised by the advance
/// itself.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// A source row is malformed or has an unexpected shape.
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Reading from the relational source failed.
    #[error("Source error: {0}")]
    SourceError(#[from] SourceError),

    /// The batch was not fully indexed.
    #[error("Index load error: {0}")]
    IndexLoadError(String),

    /// Persisting the checkpoint failed.
    #[error("Checkpoint error: {0}")]
    CheckpointError(#[from] CheckpointError),

    /// The run was stopped by the shutdown signal.
    #[error("Sync cancelled")]
    Cancelled,

    /// The task panicked or was aborted by the runtime.
    #[error("Task aborted: {0}")]
    TaskAborted(String),
}

impl PipelineError {
    /// Create a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }

    /// Create an index load error.
    pub fn index_load(msg: impl Into<String>) -> Self {
        Self::IndexLoadError(msg.into())
    }

    /// Create a task aborted error.
    pub fn aborted(msg: impl Into<String>) -> Self {
        Self::TaskAborted(msg.into())
    }

    /// Whether re-running the task later may succeed without intervention.
    ///
    /// Validation errors indicate schema drift and repeat until fixed.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::ValidationError(_))
    }
}

impl From<SearchIndexError> for PipelineError {
    fn from(err: SearchIndexError) -> Self {
        Self::IndexLoadError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_is_not_retryable() {
        assert!(!PipelineError::validation("missing id").is_retryable());
        assert!(PipelineError::index_load("refused").is_retryable());
        assert!(PipelineError::Cancelled.is_retryable());
    }

    #[test]
    fn test_source_error_conversion() {
        let err: PipelineError = SourceError::connection("reset by peer").into();
        assert!(matches!(err, PipelineError::SourceError(_)));
        assert!(err.to_string().contains("reset by peer"));
    }
}
