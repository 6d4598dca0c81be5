//! OpenSearch implementation of the search index provider.
//!
//! This module provides a concrete implementation of `SearchIndexProvider`
//! using OpenSearch as the backend, the index mappings for each entity kind
//! and the read query builders.

mod client;
mod index_config;
pub mod queries;

pub use client::OpenSearchClient;
pub use index_config::get_index_settings;
