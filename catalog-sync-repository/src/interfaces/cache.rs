//! Cache trait definition.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::CacheError;

/// Read-through cache of JSON blobs keyed by query fingerprint.
#[async_trait]
pub trait Cache: Send + Sync {
    /// Fetch a cached value, `None` on a miss or after expiry.
    async fn get(&self, key: &str) -> Result<Option<Value>, CacheError>;

    /// Store a value for `ttl`.
    async fn set(&self, key: &str, value: &Value, ttl: Duration) -> Result<(), CacheError>;
}
