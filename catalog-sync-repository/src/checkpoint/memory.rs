//! In-memory checkpoint store.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use tokio::sync::Mutex;

use super::{decode_checkpoint, encode_checkpoint};
use crate::errors::CheckpointError;
use crate::interfaces::CheckpointStore;

/// Checkpoint store that lives only as long as the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The persisted string for `key`, if any.
    pub async fn raw(&self, key: &str) -> Option<String> {
        self.values.lock().await.get(key).cloned()
    }

    /// Store an arbitrary string, bypassing encoding.
    pub async fn insert_raw(&self, key: &str, raw: impl Into<String>) {
        self.values.lock().await.insert(key.to_string(), raw.into());
    }
}

#[async_trait]
impl CheckpointStore for MemoryStore {
    async fn get(&self, key: &str, default: DateTime<FixedOffset>) -> DateTime<FixedOffset> {
        self.values
            .lock()
            .await
            .get(key)
            .and_then(|raw| decode_checkpoint(raw))
            .unwrap_or(default)
    }

    async fn set(&self, key: &str, value: DateTime<FixedOffset>) -> Result<(), CheckpointError> {
        self.values
            .lock()
            .await
            .insert(key.to_string(), encode_checkpoint(value));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_sync_shared::checkpoint_floor;

    #[tokio::test]
    async fn test_get_defaults_then_returns_latest() {
        let store = MemoryStore::new();
        assert_eq!(store.get("genre_modified", checkpoint_floor()).await, checkpoint_floor());

        let first = DateTime::parse_from_rfc3339("2023-01-01T00:00:00+00:00").unwrap();
        let second = DateTime::parse_from_rfc3339("2023-02-01T00:00:00+00:00").unwrap();
        store.set("genre_modified", first).await.unwrap();
        store.set("genre_modified", second).await.unwrap();

        assert_eq!(store.get("genre_modified", checkpoint_floor()).await, second);
    }

    #[tokio::test]
    async fn test_corrupt_value_degrades_to_default() {
        let store = MemoryStore::new();
        store.insert_raw("film_work_modified", "not a timestamp").await;

        assert_eq!(
            store.get("film_work_modified", checkpoint_floor()).await,
            checkpoint_floor()
        );
    }
}
