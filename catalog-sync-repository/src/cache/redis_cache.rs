//! Redis-backed cache.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use serde_json::Value;
use tracing::{debug, info};

use crate::errors::CacheError;
use crate::interfaces::Cache;

/// Cache storing JSON blobs in Redis with a per-key expiry.
#[derive(Clone)]
pub struct RedisCache {
    conn: ConnectionManager,
}

impl RedisCache {
    /// Connect to Redis at `url` (e.g. `redis://127.0.0.1:6379`).
    pub async fn new(url: &str) -> Result<Self, CacheError> {
        let client = redis::Client::open(url).map_err(|e| CacheError::connection(e.to_string()))?;
        let conn = ConnectionManager::new(client)
            .await
            .map_err(|e| CacheError::connection(e.to_string()))?;

        info!(url = %url, "Connected to Redis");
        Ok(Self { conn })
    }
}

#[async_trait]
impl Cache for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<Value>, CacheError> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn.get(key).await?;
        match raw {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &Value, ttl: Duration) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        let payload = serde_json::to_string(value)?;
        let seconds = ttl.as_secs().max(1);
        let _: () = conn.set_ex(key, payload, seconds).await?;
        debug!(key, ttl_secs = seconds, "Cached value");
        Ok(())
    }
}
