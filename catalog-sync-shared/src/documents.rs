//! Denormalized documents stored in the search index.
//!
//! Each document is derived from exactly one source record and is addressed
//! in the index by the stringified record id, which makes repeated bulk
//! upserts of the same document idempotent.

use serde::{Deserialize, Serialize};

use crate::kind::EntityKind;

/// A related entity embedded in a document (genre, actor, director, writer).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedEntity {
    pub id: String,
    pub name: String,
}

impl RelatedEntity {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Film document stored in the `movies` index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilmDocument {
    pub id: String,
    pub imdb_rating: Option<f64>,
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub genres: Vec<RelatedEntity>,
    #[serde(default)]
    pub actors_names: Vec<String>,
    #[serde(default)]
    pub directors_names: Vec<String>,
    #[serde(default)]
    pub writers_names: Vec<String>,
    #[serde(default)]
    pub actors: Vec<RelatedEntity>,
    #[serde(default)]
    pub directors: Vec<RelatedEntity>,
    #[serde(default)]
    pub writers: Vec<RelatedEntity>,
}

/// Genre document stored in the `genres` index.
///
/// Timestamps are ISO-8601 strings with their original offset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenreDocument {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub created: String,
    pub modified: String,
}

/// A film entry embedded in a person document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonFilm {
    pub id: String,
    #[serde(default)]
    pub roles: Vec<String>,
    pub title: String,
    pub imdb_rating: Option<f64>,
}

/// Person document stored in the `persons` index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonDocument {
    pub id: String,
    pub full_name: String,
    #[serde(default)]
    pub films: Vec<PersonFilm>,
}

/// A search document of any supported kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SearchDocument {
    Film(FilmDocument),
    Genre(GenreDocument),
    Person(PersonDocument),
}

impl SearchDocument {
    /// The document id, used as the bulk upsert key.
    pub fn id(&self) -> &str {
        match self {
            SearchDocument::Film(doc) => &doc.id,
            SearchDocument::Genre(doc) => &doc.id,
            SearchDocument::Person(doc) => &doc.id,
        }
    }

    pub fn kind(&self) -> EntityKind {
        match self {
            SearchDocument::Film(_) => EntityKind::Film,
            SearchDocument::Genre(_) => EntityKind::Genre,
            SearchDocument::Person(_) => EntityKind::Person,
        }
    }

    /// The JSON body sent to the search engine.
    pub fn to_body(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}
