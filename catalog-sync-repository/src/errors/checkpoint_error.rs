//! Checkpoint store error types.

use thiserror::Error;

/// Errors that can occur while persisting a checkpoint.
///
/// Reads never fail: a missing or unreadable checkpoint degrades to the
/// caller's default. Only writes surface these errors.
#[derive(Debug, Error)]
pub enum CheckpointError {
    /// Writing or renaming the backing file failed.
    #[error("Checkpoint IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The checkpoint state could not be serialized.
    #[error("Checkpoint serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Any other backend failure.
    #[error("Checkpoint backend error: {0}")]
    Backend(String),
}

impl CheckpointError {
    /// Create a backend error.
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }
}
