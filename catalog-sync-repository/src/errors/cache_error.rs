//! Cache error types.

use thiserror::Error;

/// Errors that can occur while talking to the cache backend.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Failed to connect to the cache backend.
    #[error("Cache connection error: {0}")]
    ConnectionError(String),

    /// A cache command failed.
    #[error("Cache command error: {0}")]
    CommandError(String),

    /// A cached value could not be encoded or decoded.
    #[error("Cache serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl CacheError {
    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::ConnectionError(msg.into())
    }

    /// Create a command error.
    pub fn command(msg: impl Into<String>) -> Self {
        Self::CommandError(msg.into())
    }
}

impl From<redis::RedisError> for CacheError {
    fn from(err: redis::RedisError) -> Self {
        if err.is_connection_refusal() || err.is_connection_dropped() || err.is_io_error() {
            Self::ConnectionError(err.to_string())
        } else {
            Self::CommandError(err.to_string())
        }
    }
}
