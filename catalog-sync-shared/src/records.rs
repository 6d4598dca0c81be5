//! Typed snapshots of relational source rows.
//!
//! A record is read-only and lives for a single pipeline iteration. Every
//! record carries a `modified` timestamp, which is the ordering and
//! checkpoint key of the incremental sync.

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Deserializer};
use uuid::Uuid;

use crate::kind::EntityKind;

/// A raw source row, one JSON object per relational row.
pub type RawRow = serde_json::Map<String, serde_json::Value>;

/// The checkpoint used when none has been persisted yet.
///
/// Matches the earliest calendar date the relational source accepts for a
/// `timestamptz` parameter without special casing (0001-01-01 UTC).
pub fn checkpoint_floor() -> DateTime<FixedOffset> {
    NaiveDate::from_ymd_opt(1, 1, 1)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc().fixed_offset())
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH.fixed_offset())
}

/// Deserialize a column that may hold `null` but must be present.
///
/// Plain `Option` fields treat a missing key as `None`, which would let a
/// renamed or dropped column through as an empty value.
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer)
}

/// A film work row with its relations already aggregated by the source query.
///
/// Relation lists hold entries encoded as `"<id>: <name>"`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FilmRecord {
    pub id: Uuid,
    pub title: String,
    #[serde(deserialize_with = "nullable")]
    pub description: Option<String>,
    #[serde(deserialize_with = "nullable")]
    pub rating: Option<f64>,
    #[serde(rename = "type")]
    pub film_type: String,
    pub created: DateTime<FixedOffset>,
    pub modified: DateTime<FixedOffset>,
    #[serde(deserialize_with = "nullable")]
    pub genres: Option<Vec<String>>,
    #[serde(deserialize_with = "nullable")]
    pub actors: Option<Vec<String>>,
    #[serde(deserialize_with = "nullable")]
    pub directors: Option<Vec<String>>,
    #[serde(deserialize_with = "nullable")]
    pub writers: Option<Vec<String>>,
}

/// A genre row.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GenreRecord {
    pub id: Uuid,
    pub name: String,
    #[serde(deserialize_with = "nullable")]
    pub description: Option<String>,
    pub created: DateTime<FixedOffset>,
    pub modified: DateTime<FixedOffset>,
}

/// One film a person took part in, as aggregated by the person query.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PersonFilmRecord {
    pub id: Uuid,
    pub roles: Vec<String>,
    pub title: String,
    #[serde(deserialize_with = "nullable")]
    pub rating: Option<f64>,
}

/// A person row with the films they took part in.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PersonRecord {
    pub id: Uuid,
    pub full_name: String,
    pub modified: DateTime<FixedOffset>,
    #[serde(deserialize_with = "nullable")]
    pub films: Option<Vec<PersonFilmRecord>>,
}

/// A typed source record of any supported kind.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceRecord {
    Film(FilmRecord),
    Genre(GenreRecord),
    Person(PersonRecord),
}

impl SourceRecord {
    pub fn kind(&self) -> EntityKind {
        match self {
            SourceRecord::Film(_) => EntityKind::Film,
            SourceRecord::Genre(_) => EntityKind::Genre,
            SourceRecord::Person(_) => EntityKind::Person,
        }
    }

    pub fn id(&self) -> Uuid {
        match self {
            SourceRecord::Film(r) => r.id,
            SourceRecord::Genre(r) => r.id,
            SourceRecord::Person(r) => r.id,
        }
    }

    /// The change-tracking timestamp of the row.
    pub fn modified(&self) -> DateTime<FixedOffset> {
        match self {
            SourceRecord::Film(r) => r.modified,
            SourceRecord::Genre(r) => r.modified,
            SourceRecord::Person(r) => r.modified,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_checkpoint_floor_is_year_one() {
        let floor = checkpoint_floor();
        assert_eq!(floor.to_rfc3339(), "0001-01-01T00:00:00+00:00");
    }

    #[test]
    fn test_film_record_accepts_null_relations() {
        let record: FilmRecord = serde_json::from_value(json!({
            "id": "3d825f60-9fff-4dfe-b294-1a45fa1e115d",
            "title": "Star Wars",
            "description": null,
            "rating": 8.6,
            "type": "movie",
            "created": "2021-06-16T20:14:09.221838+00:00",
            "modified": "2021-06-16T20:14:09.221855+00:00",
            "genres": null,
            "actors": null,
            "directors": ["a5a8f573-3cee-4ccc-8a2b-91cb9f55250a: George Lucas"],
            "writers": null
        }))
        .unwrap();

        assert_eq!(record.film_type, "movie");
        assert!(record.actors.is_none());
        assert_eq!(record.directors.as_ref().map(Vec::len), Some(1));
    }

    #[test]
    fn test_source_record_accessors() {
        let modified = DateTime::parse_from_rfc3339("2023-01-01T10:00:00+03:00").unwrap();
        let record = SourceRecord::Genre(GenreRecord {
            id: Uuid::nil(),
            name: "Drama".to_string(),
            description: None,
            created: modified,
            modified,
        });

        assert_eq!(record.kind(), EntityKind::Genre);
        assert_eq!(record.id(), Uuid::nil());
        assert_eq!(record.modified(), modified);
    }
}
