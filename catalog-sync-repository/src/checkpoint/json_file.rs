//! JSON file checkpoint store.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use tempfile::NamedTempFile;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::{decode_checkpoint, encode_checkpoint};
use crate::errors::CheckpointError;
use crate::interfaces::CheckpointStore;

type CheckpointMap = BTreeMap<String, String>;

/// Stores all checkpoints as one JSON object in a single file.
///
/// ```json
/// { "film_work_modified": "2021-06-16T20:14:09.221855+00:00" }
/// ```
///
/// Writes go to a temporary file in the same directory which is flushed to
/// disk and then renamed over the target, so a crash leaves either the old or
/// the new file. Several tasks may share one store; writes are serialized.
pub struct JsonFileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the whole file. Missing file means no checkpoints yet.
    async fn load(&self) -> Result<CheckpointMap, CheckpointError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(CheckpointMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn persist(&self, state: CheckpointMap) -> Result<(), CheckpointError> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || write_atomically(&path, &state))
            .await
            .map_err(|e| CheckpointError::backend(format!("Checkpoint writer panicked: {}", e)))?
    }
}

fn write_atomically(path: &Path, state: &CheckpointMap) -> Result<(), CheckpointError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&dir)?;

    let mut tmp = NamedTempFile::new_in(&dir)?;
    serde_json::to_writer_pretty(&mut tmp, state)?;
    tmp.write_all(b"\n")?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| CheckpointError::Io(e.error))?;
    Ok(())
}

#[async_trait]
impl CheckpointStore for JsonFileStore {
    async fn get(&self, key: &str, default: DateTime<FixedOffset>) -> DateTime<FixedOffset> {
        let state = match self.load().await {
            Ok(state) => state,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Checkpoint file unreadable, using default");
                return default;
            }
        };

        match state.get(key) {
            Some(raw) => decode_checkpoint(raw).unwrap_or_else(|| {
                warn!(key, value = %raw, "Checkpoint value is not a timestamp, using default");
                default
            }),
            None => default,
        }
    }

    async fn set(&self, key: &str, value: DateTime<FixedOffset>) -> Result<(), CheckpointError> {
        let _guard = self.write_lock.lock().await;

        let mut state = self.load().await.unwrap_or_else(|e| {
            warn!(path = %self.path.display(), error = %e, "Replacing unreadable checkpoint file");
            CheckpointMap::new()
        });
        let encoded = encode_checkpoint(value);
        state.insert(key.to_string(), encoded.clone());

        self.persist(state).await?;
        debug!(key, value = %encoded, "Checkpoint persisted");
        Ok(())
    }
}
