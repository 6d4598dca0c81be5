//! # Catalog Query
//!
//! Read-path services answering film, genre and person lookups from the
//! search indices, with a read-through cache in front of every query.
//!
//! The cache and search provider are passed in at construction; services
//! hold no global state.

pub mod errors;
pub mod films;
pub mod genres;
pub mod persons;
mod read_through;

pub use catalog_sync_repository::opensearch::queries::Page;
pub use errors::QueryError;
pub use films::FilmService;
pub use genres::GenreService;
pub use persons::PersonService;
pub use read_through::{ServiceConfig, DEFAULT_CACHE_TTL};

#[cfg(test)]
pub(crate) mod test_support;
