//! Record extraction and document transformation.
//!
//! Each entity kind maps to a pair of pure functions: one validating a raw
//! source row into a typed record, one shaping that record into the
//! denormalized search document. Neither performs I/O.

mod extract;
mod transform;

pub use extract::{extract_film, extract_genre, extract_person};
pub use transform::{
    parse_relation, parse_relations, transform_film, transform_genre, transform_person,
    RELATION_SEPARATOR,
};

use chrono::{DateTime, FixedOffset};
use tracing::{debug, instrument};

use crate::errors::PipelineError;
use catalog_sync_shared::{EntityKind, RawRow, SearchDocument, SourceRecord};

/// Validates a raw row into a typed record.
pub type ExtractFn = fn(&RawRow) -> Result<SourceRecord, PipelineError>;

/// Shapes a typed record into its search document.
pub type TransformFn = fn(&SourceRecord) -> Result<SearchDocument, PipelineError>;

/// The extract/transform pair used for one entity kind.
#[derive(Clone, Copy)]
pub struct Mapping {
    pub extract: ExtractFn,
    pub transform: TransformFn,
}

impl Mapping {
    /// The mapping for `kind`.
    pub fn for_kind(kind: EntityKind) -> Self {
        match kind {
            EntityKind::Film => Self {
                extract: extract_film,
                transform: transform_film,
            },
            EntityKind::Genre => Self {
                extract: extract_genre,
                transform: transform_genre,
            },
            EntityKind::Person => Self {
                extract: extract_person,
                transform: transform_person,
            },
        }
    }
}

impl std::fmt::Debug for Mapping {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mapping").finish_non_exhaustive()
    }
}

/// Documents produced from one source batch.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedBatch {
    pub documents: Vec<SearchDocument>,
    /// Largest `modified` among the batch rows; the next checkpoint.
    pub max_modified: Option<DateTime<FixedOffset>>,
    /// `modified` of the last row in source order.
    pub last_modified: Option<DateTime<FixedOffset>>,
    /// Whether the last two rows share the same `modified`.
    pub ends_in_tie: bool,
}

/// Processor that turns raw source rows into search documents.
#[derive(Debug, Clone, Copy)]
pub struct RecordProcessor {
    kind: EntityKind,
    mapping: Mapping,
}

impl RecordProcessor {
    /// Create a processor using the built-in mapping for `kind`.
    pub fn new(kind: EntityKind) -> Self {
        Self::with_mapping(kind, Mapping::for_kind(kind))
    }

    /// Create a processor with a custom mapping.
    pub fn with_mapping(kind: EntityKind, mapping: Mapping) -> Self {
        Self { kind, mapping }
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Extract and transform a single row.
    pub fn process_row(&self, row: &RawRow) -> Result<(SearchDocument, DateTime<FixedOffset>), PipelineError> {
        let record = (self.mapping.extract)(row)?;
        let document = (self.mapping.transform)(&record)?;
        Ok((document, record.modified()))
    }

    /// Process a whole batch.
    ///
    /// The first invalid row fails the batch; no document of a batch is
    /// returned unless every row is valid.
    #[instrument(skip(self, rows), fields(kind = %self.kind, row_count = rows.len()))]
    pub fn process_batch(&self, rows: &[RawRow]) -> Result<ProcessedBatch, PipelineError> {
        let mut documents = Vec::with_capacity(rows.len());
        let mut max_modified: Option<DateTime<FixedOffset>> = None;
        let mut previous: Option<DateTime<FixedOffset>> = None;
        let mut ends_in_tie = false;

        for row in rows {
            let (document, modified) = self.process_row(row)?;
            documents.push(document);

            ends_in_tie = previous == Some(modified);
            previous = Some(modified);
            max_modified = Some(max_modified.map_or(modified, |max| max.max(modified)));
        }

        debug!(processed_count = documents.len(), "Processed row batch");
        Ok(ProcessedBatch {
            documents,
            max_modified,
            last_modified: previous,
            ends_in_tie,
        })
    }
}
