//! Typed record to search document transformation.

use crate::errors::PipelineError;
use catalog_sync_shared::{
    FilmDocument, FilmRecord, GenreDocument, GenreRecord, PersonDocument, PersonFilm, PersonRecord,
    RelatedEntity, SearchDocument, SourceRecord,
};

/// Separator between id and name in an aggregated relation entry.
pub const RELATION_SEPARATOR: &str = ": ";

/// Parse `"<id>: <name>"` into a related entity.
///
/// Only the first separator splits, so names may contain `": "` themselves.
pub fn parse_relation(entry: &str) -> Result<RelatedEntity, PipelineError> {
    match entry.split_once(RELATION_SEPARATOR) {
        Some((id, name)) if !id.trim().is_empty() => Ok(RelatedEntity::new(id.trim(), name)),
        _ => Err(PipelineError::validation(format!(
            "Relation entry {:?} is not in \"<id>: <name>\" form",
            entry
        ))),
    }
}

/// Parse a whole relation list; `None` becomes an empty list.
pub fn parse_relations(entries: Option<&[String]>) -> Result<Vec<RelatedEntity>, PipelineError> {
    entries
        .unwrap_or_default()
        .iter()
        .map(|entry| parse_relation(entry))
        .collect()
}

fn names(entities: &[RelatedEntity]) -> Vec<String> {
    entities.iter().map(|entity| entity.name.clone()).collect()
}

fn film_document(record: &FilmRecord) -> Result<FilmDocument, PipelineError> {
    let genres = parse_relations(record.genres.as_deref())?;
    let actors = parse_relations(record.actors.as_deref())?;
    let directors = parse_relations(record.directors.as_deref())?;
    let writers = parse_relations(record.writers.as_deref())?;

    Ok(FilmDocument {
        id: record.id.to_string(),
        imdb_rating: record.rating,
        title: record.title.clone(),
        description: record.description.clone(),
        genres,
        actors_names: names(&actors),
        directors_names: names(&directors),
        writers_names: names(&writers),
        actors,
        directors,
        writers,
    })
}

fn genre_document(record: &GenreRecord) -> GenreDocument {
    GenreDocument {
        id: record.id.to_string(),
        name: record.name.clone(),
        description: record.description.clone(),
        created: record.created.to_rfc3339(),
        modified: record.modified.to_rfc3339(),
    }
}

fn person_document(record: &PersonRecord) -> PersonDocument {
    let films = record
        .films
        .as_deref()
        .unwrap_or_default()
        .iter()
        .map(|film| PersonFilm {
            id: film.id.to_string(),
            roles: film.roles.clone(),
            title: film.title.clone(),
            imdb_rating: film.rating,
        })
        .collect();

    PersonDocument {
        id: record.id.to_string(),
        full_name: record.full_name.clone(),
        films,
    }
}

pub fn transform_film(record: &SourceRecord) -> Result<SearchDocument, PipelineError> {
    match record {
        SourceRecord::Film(film) => film_document(film).map(SearchDocument::Film),
        other => Err(mismatch("film", other)),
    }
}

pub fn transform_genre(record: &SourceRecord) -> Result<SearchDocument, PipelineError> {
    match record {
        SourceRecord::Genre(genre) => Ok(SearchDocument::Genre(genre_document(genre))),
        other => Err(mismatch("genre", other)),
    }
}

pub fn transform_person(record: &SourceRecord) -> Result<SearchDocument, PipelineError> {
    match record {
        SourceRecord::Person(person) => Ok(SearchDocument::Person(person_document(person))),
        other => Err(mismatch("person", other)),
    }
}

fn mismatch(expected: &str, record: &SourceRecord) -> PipelineError {
    PipelineError::validation(format!(
        "Expected a {} record, got {} {}",
        expected,
        record.kind(),
        record.id()
    ))
}
