//! # Catalog Sync Shared
//!
//! Types shared by every crate of the catalog sync system: the entity kinds
//! being synchronized, the typed records read from the relational source and
//! the denormalized documents written to the search index.

mod documents;
mod kind;
mod records;

pub use documents::{FilmDocument, GenreDocument, PersonDocument, PersonFilm, RelatedEntity, SearchDocument};
pub use kind::EntityKind;
pub use records::{
    checkpoint_floor, FilmRecord, GenreRecord, PersonFilmRecord, PersonRecord, RawRow, SourceRecord,
};
