//! Service settings read from the environment.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::SyncError;
use catalog_sync_repository::RetryPolicy;

/// Default PostgreSQL connection string.
const DEFAULT_POSTGRES_DSN: &str = "host=localhost port=5432 user=app password=123qwe dbname=movies_database";

/// Default OpenSearch URL.
const DEFAULT_OPENSEARCH_URL: &str = "http://localhost:9200";

/// Default Redis URL.
const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";

/// Default checkpoint file.
const DEFAULT_CHECKPOINT_PATH: &str = "storage.json";

const DEFAULT_PAGE_SIZE: usize = 100;
const DEFAULT_INTERVAL_SECS: u64 = 60;
const DEFAULT_RETRY_MAX_ATTEMPTS: u32 = 5;
const DEFAULT_RETRY_BASE_DELAY_MS: u64 = 100;
const DEFAULT_RETRY_MAX_DELAY_MS: u64 = 10_000;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

/// Settings of the sync service.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub postgres_dsn: String,
    pub opensearch_url: String,
    pub redis_url: String,
    pub checkpoint_path: PathBuf,
    pub page_size: usize,
    /// Pause between sync passes; `None` runs a single pass.
    pub interval: Option<Duration>,
    pub concurrent: bool,
    pub retry: RetryPolicy,
    /// Directory with `load_*.sql` templates overriding the built-in ones.
    pub query_dir: Option<PathBuf>,
    pub log_format: LogFormat,
}

impl Settings {
    /// Read settings from the process environment.
    ///
    /// # Environment Variables
    ///
    /// - `POSTGRES_DSN`: source connection string
    /// - `OPENSEARCH_URL`: OpenSearch server URL (default: http://localhost:9200)
    /// - `REDIS_URL`: cache server URL (default: redis://127.0.0.1:6379)
    /// - `CHECKPOINT_PATH`: checkpoint file (default: storage.json)
    /// - `SYNC_PAGE_SIZE`: rows per batch (default: 100)
    /// - `SYNC_INTERVAL_SECS`: pause between passes, 0 for a single pass (default: 60)
    /// - `SYNC_CONCURRENT`: run tasks concurrently (default: false)
    /// - `RETRY_MAX_ATTEMPTS`, `RETRY_BASE_DELAY_MS`, `RETRY_MAX_DELAY_MS`: backoff policy
    /// - `SYNC_QUERY_DIR`: directory of query template overrides
    /// - `LOG_FORMAT`: `json` for JSON logs
    pub fn from_env() -> Result<Self, SyncError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Read settings through `lookup`, which returns a variable's value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, SyncError> {
        let var = |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.to_string());

        let page_size: usize = parse(&lookup, "SYNC_PAGE_SIZE", DEFAULT_PAGE_SIZE)?;
        if page_size == 0 {
            return Err(SyncError::config("SYNC_PAGE_SIZE must be at least 1"));
        }

        let interval_secs: u64 = parse(&lookup, "SYNC_INTERVAL_SECS", DEFAULT_INTERVAL_SECS)?;
        let max_attempts: u32 = parse(&lookup, "RETRY_MAX_ATTEMPTS", DEFAULT_RETRY_MAX_ATTEMPTS)?;
        let base_delay_ms: u64 = parse(&lookup, "RETRY_BASE_DELAY_MS", DEFAULT_RETRY_BASE_DELAY_MS)?;
        let max_delay_ms: u64 = parse(&lookup, "RETRY_MAX_DELAY_MS", DEFAULT_RETRY_MAX_DELAY_MS)?;

        let concurrent = match lookup("SYNC_CONCURRENT") {
            None => false,
            Some(raw) => parse_bool(&raw)
                .ok_or_else(|| SyncError::config(format!("SYNC_CONCURRENT must be true or false, got {:?}", raw)))?,
        };

        let log_format = match lookup("LOG_FORMAT").as_deref().map(str::to_ascii_lowercase).as_deref() {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Text,
        };

        Ok(Self {
            postgres_dsn: var("POSTGRES_DSN", DEFAULT_POSTGRES_DSN),
            opensearch_url: var("OPENSEARCH_URL", DEFAULT_OPENSEARCH_URL),
            redis_url: var("REDIS_URL", DEFAULT_REDIS_URL),
            checkpoint_path: PathBuf::from(var("CHECKPOINT_PATH", DEFAULT_CHECKPOINT_PATH)),
            page_size,
            interval: (interval_secs > 0).then(|| Duration::from_secs(interval_secs)),
            concurrent,
            retry: RetryPolicy {
                max_attempts: max_attempts.max(1),
                base_delay: Duration::from_millis(base_delay_ms),
                max_delay: Duration::from_millis(max_delay_ms),
                jitter: true,
            },
            query_dir: lookup("SYNC_QUERY_DIR")
                .filter(|dir| !dir.trim().is_empty())
                .map(PathBuf::from),
            log_format,
        })
    }
}

fn parse<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, name: &str, default: T) -> Result<T, SyncError> {
    match lookup(name) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| SyncError::config(format!("{} must be a non-negative integer, got {:?}", name, raw))),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
