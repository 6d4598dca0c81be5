//! Checkpoint store implementations.
//!
//! - `JsonFileStore` keeps every key in one JSON document on disk and
//!   replaces it atomically on each write.
//! - `MemoryStore` keeps keys in process memory.

mod json_file;
mod memory;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

use chrono::{DateTime, FixedOffset};

/// Encode a checkpoint the way it is persisted.
pub fn encode_checkpoint(value: DateTime<FixedOffset>) -> String {
    value.to_rfc3339()
}

/// Decode a persisted checkpoint; `None` when the value is not ISO-8601.
pub fn decode_checkpoint(raw: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(raw.trim()).ok()
}
