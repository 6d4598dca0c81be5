//! Checkpoint store trait definition.

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};

use crate::errors::CheckpointError;

/// Durable mapping from checkpoint key to high-water-mark timestamp.
#[async_trait]
pub trait CheckpointStore: Send + Sync {
    /// Return the persisted value for `key`, or `default` when it was never
    /// set or the store cannot be read. Never fails.
    async fn get(&self, key: &str, default: DateTime<FixedOffset>) -> DateTime<FixedOffset>;

    /// Persist `value` under `key`, replacing any previous value.
    ///
    /// A crash during the write leaves either the old or the new value.
    async fn set(&self, key: &str, value: DateTime<FixedOffset>) -> Result<(), CheckpointError>;
}
