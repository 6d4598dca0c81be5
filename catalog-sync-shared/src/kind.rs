//! Entity kinds handled by the pipeline.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The kinds of catalog entities that are synchronized into the search index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Film,
    Genre,
    Person,
}

impl EntityKind {
    /// All kinds, in the order the default sync tasks run.
    pub const ALL: [EntityKind; 3] = [EntityKind::Film, EntityKind::Genre, EntityKind::Person];

    /// Short, stable name used in logs, cache keys and file names.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Film => "film_work",
            EntityKind::Genre => "genre",
            EntityKind::Person => "person",
        }
    }

    /// Default search index holding documents of this kind.
    pub fn default_index(&self) -> &'static str {
        match self {
            EntityKind::Film => "movies",
            EntityKind::Genre => "genres",
            EntityKind::Person => "persons",
        }
    }

    /// Default checkpoint key under which the high-water-mark is persisted.
    pub fn default_checkpoint_key(&self) -> String {
        format!("{}_modified", self.as_str())
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
