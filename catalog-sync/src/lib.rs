//! # Catalog Sync
//!
//! Entry point library for the catalog sync service: configuration,
//! dependency wiring and the periodic run loop around the pipeline.

pub mod config;
pub mod logging;
pub mod runner;

pub use config::{Dependencies, Settings};

use thiserror::Error;

/// Errors that can occur during service initialization or execution.
#[derive(Error, Debug)]
pub enum SyncError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Search error.
    #[error("Search error: {0}")]
    SearchError(#[from] catalog_sync_repository::SearchIndexError),
}

impl SyncError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}
