//! Sync task definition, run states and reports.

use std::path::Path;

use catalog_sync_repository::{QueryDefinition, SourceError};
use catalog_sync_shared::EntityKind;

use crate::errors::PipelineError;

/// One named sync job: where to read, how to map and where to write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncTask {
    pub name: String,
    pub kind: EntityKind,
    /// Key under which this task's high-water-mark is stored.
    pub checkpoint_key: String,
    /// Target search index.
    pub index: String,
    pub query: QueryDefinition,
}

impl SyncTask {
    pub fn new(
        name: impl Into<String>,
        kind: EntityKind,
        checkpoint_key: impl Into<String>,
        index: impl Into<String>,
        query: QueryDefinition,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            checkpoint_key: checkpoint_key.into(),
            index: index.into(),
            query,
        }
    }

    /// The default task for `kind`, using the built-in query template.
    pub fn for_kind(kind: EntityKind) -> Self {
        Self::new(
            kind.as_str(),
            kind,
            kind.default_checkpoint_key(),
            kind.default_index(),
            QueryDefinition::builtin(kind),
        )
    }

    /// The default task for `kind`, reading its query template from `dir`.
    pub fn for_kind_in_dir(kind: EntityKind, dir: impl AsRef<Path>) -> Result<Self, SourceError> {
        let query = QueryDefinition::from_file(dir.as_ref().join(QueryDefinition::template_file_name(kind)))?;
        Ok(Self {
            query,
            ..Self::for_kind(kind)
        })
    }
}

/// States of a task run.
///
/// `Idle -> Fetching -> Transforming -> Loading -> Checkpointing -> Fetching`
/// until the source is empty (`Drained`) or something fails (`Failed`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Idle,
    Fetching,
    Transforming,
    Loading,
    Checkpointing,
    Drained,
    Failed,
}

impl SyncState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SyncState::Drained | SyncState::Failed)
    }

    /// Whether the state machine allows going from `self` to `next`.
    pub fn can_transition_to(&self, next: SyncState) -> bool {
        use SyncState::*;

        match (self, next) {
            (Drained | Failed, _) => false,
            (_, Failed) => true,
            (Idle, Fetching) => true,
            (Fetching, Transforming | Drained) => true,
            (Transforming, Loading) => true,
            (Loading, Checkpointing) => true,
            (Checkpointing, Fetching) => true,
            _ => false,
        }
    }
}

/// Summary of one task run.
#[derive(Debug)]
pub struct TaskReport {
    pub task: String,
    /// Non-empty batches fetched.
    pub batches: usize,
    /// Documents indexed by batches whose checkpoint was persisted.
    pub documents: usize,
    pub final_state: SyncState,
    /// Persisted checkpoint when the run ended, if any.
    pub checkpoint: Option<String>,
    pub error: Option<PipelineError>,
}

impl TaskReport {
    pub fn new(task: impl Into<String>) -> Self {
        Self {
            task: task.into(),
            batches: 0,
            documents: 0,
            final_state: SyncState::Idle,
            checkpoint: None,
            error: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.final_state == SyncState::Drained
    }
}
