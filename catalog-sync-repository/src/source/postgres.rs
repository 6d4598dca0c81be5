//! PostgreSQL implementation of the source reader.

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;
use tokio_postgres::error::SqlState;
use tokio_postgres::{Client, NoTls};
use tracing::{debug, error, info, instrument, warn};

use crate::errors::SourceError;
use crate::interfaces::SourceReader;
use crate::retry::{RetryError, RetryPolicy};
use crate::source::QueryDefinition;
use crate::types::FetchParams;
use catalog_sync_shared::RawRow;

/// Configuration for the PostgreSQL reader.
#[derive(Debug, Clone)]
pub struct PostgresReaderConfig {
    /// libpq-style connection string.
    pub dsn: String,
    /// Retry policy applied to each fetch.
    pub retry: RetryPolicy,
}

impl PostgresReaderConfig {
    pub fn new(dsn: impl Into<String>) -> Self {
        Self {
            dsn: dsn.into(),
            retry: RetryPolicy::default(),
        }
    }
}

/// Source reader backed by a single PostgreSQL connection.
///
/// The connection is opened lazily and re-opened after it drops. Concurrent
/// fetches are serialized on the connection.
pub struct PostgresReader {
    config: PostgresReaderConfig,
    client: Mutex<Option<Client>>,
}

impl PostgresReader {
    pub fn new(config: PostgresReaderConfig) -> Self {
        Self {
            config,
            client: Mutex::new(None),
        }
    }

    /// Open the connection eagerly so misconfiguration shows up at startup.
    pub async fn connect(&self) -> Result<(), SourceError> {
        let mut guard = self.client.lock().await;
        *guard = Some(self.open().await?);
        Ok(())
    }

    async fn open(&self) -> Result<Client, SourceError> {
        let (client, connection) = tokio_postgres::connect(&self.config.dsn, NoTls)
            .await
            .map_err(|e| SourceError::connection(format!("Failed to connect to PostgreSQL: {}", e)))?;

        // Spawn connection handler
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                error!(error = %e, "PostgreSQL connection error");
            }
        });

        info!("Connected to PostgreSQL");
        Ok(client)
    }

    /// One full execution of the bounded query.
    async fn fetch_once(&self, sql: &str, params: FetchParams) -> Result<Vec<RawRow>, SourceError> {
        let limit = i64::try_from(params.page_size)
            .map_err(|_| SourceError::query(format!("Page size {} is too large", params.page_size)))?;

        let mut guard = self.client.lock().await;
        let client = match guard.take() {
            Some(client) if !client.is_closed() => client,
            _ => self.open().await?,
        };

        let result = client.query(sql, &[&params.dttm, &limit]).await;
        let rows = match result {
            Ok(rows) => {
                *guard = Some(client);
                rows
            }
            Err(e) => {
                let err = classify(&e);
                // Keep the connection unless it is the thing that failed.
                if !err.is_transient() {
                    *guard = Some(client);
                }
                return Err(err);
            }
        };
        drop(guard);

        rows.iter()
            .map(|row| {
                let value: Value = row
                    .try_get(0)
                    .map_err(|e| SourceError::decode(e.to_string()))?;
                match value {
                    Value::Object(map) => Ok(map),
                    other => Err(SourceError::decode(format!(
                        "Expected a JSON object per row, got {}",
                        other
                    ))),
                }
            })
            .collect()
    }
}

/// Map a driver error onto the source error taxonomy.
///
/// Anything that is not a server-side error, plus the connection-exception
/// and shutdown classes, means the connection itself is unusable.
fn classify(err: &tokio_postgres::Error) -> SourceError {
    match err.code() {
        None => SourceError::connection(err.to_string()),
        Some(code) if is_connection_state(code) => SourceError::connection(err.to_string()),
        Some(_) => SourceError::query(err.to_string()),
    }
}

fn is_connection_state(code: &SqlState) -> bool {
    code.code().starts_with("08")
        || *code == SqlState::ADMIN_SHUTDOWN
        || *code == SqlState::CRASH_SHUTDOWN
        || *code == SqlState::CANNOT_CONNECT_NOW
        || *code == SqlState::TOO_MANY_CONNECTIONS
}

#[async_trait]
impl SourceReader for PostgresReader {
    #[instrument(skip(self, query), fields(query = %query.name(), dttm = %params.dttm, page_size = params.page_size))]
    async fn fetch(
        &self,
        query: &QueryDefinition,
        params: FetchParams,
    ) -> Result<Vec<RawRow>, SourceError> {
        let sql = query.bounded_sql();

        let rows = self
            .config
            .retry
            .run(
                query.name(),
                |_| self.fetch_once(&sql, params),
                SourceError::is_transient,
            )
            .await
            .map_err(|e| match e {
                RetryError::Permanent { error, .. } => error,
                RetryError::Exhausted { attempts, last } => {
                    warn!(attempts, error = %last, "Giving up on source query");
                    SourceError::Exhausted {
                        attempts,
                        last: last.to_string(),
                    }
                }
            })?;

        debug!(rows = rows.len(), "Fetched source batch");
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_states() {
        assert!(is_connection_state(&SqlState::CONNECTION_FAILURE));
        assert!(is_connection_state(&SqlState::ADMIN_SHUTDOWN));
        assert!(!is_connection_state(&SqlState::SYNTAX_ERROR));
        assert!(!is_connection_state(&SqlState::UNDEFINED_TABLE));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unreachable_source_exhausts_retries() {
        let reader = PostgresReader::new(PostgresReaderConfig {
            dsn: "host=127.0.0.1 port=1 user=nobody dbname=none connect_timeout=1".to_string(),
            retry: RetryPolicy {
                max_attempts: 2,
                jitter: false,
                ..RetryPolicy::default()
            },
        });

        let params = FetchParams::new(catalog_sync_shared::checkpoint_floor(), 10);
        let result = reader
            .fetch(&QueryDefinition::builtin(catalog_sync_shared::EntityKind::Genre), params)
            .await;

        assert!(matches!(result, Err(SourceError::Exhausted { attempts: 2, .. })));
    }
}
