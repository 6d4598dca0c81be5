//! Raw row to typed record extraction.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::errors::PipelineError;
use catalog_sync_shared::{EntityKind, FilmRecord, GenreRecord, PersonRecord, RawRow, SourceRecord};

/// Deserialize a raw row into the record type of `kind`.
///
/// A missing required field or a field of the wrong type is reported with
/// the row id when the row has one.
fn extract_as<T: DeserializeOwned>(kind: EntityKind, row: &RawRow) -> Result<T, PipelineError> {
    serde_json::from_value(Value::Object(row.clone())).map_err(|e| {
        let id = row.get("id").and_then(Value::as_str).unwrap_or("<no id>");
        PipelineError::validation(format!("{} row {}: {}", kind, id, e))
    })
}

pub fn extract_film(row: &RawRow) -> Result<SourceRecord, PipelineError> {
    extract_as::<FilmRecord>(EntityKind::Film, row).map(SourceRecord::Film)
}

pub fn extract_genre(row: &RawRow) -> Result<SourceRecord, PipelineError> {
    extract_as::<GenreRecord>(EntityKind::Genre, row).map(SourceRecord::Genre)
}

pub fn extract_person(row: &RawRow) -> Result<SourceRecord, PipelineError> {
    extract_as::<PersonRecord>(EntityKind::Person, row).map(SourceRecord::Person)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> RawRow {
        match value {
            Value::Object(map) => map,
            _ => panic!("test rows are objects"),
        }
    }

    #[test]
    fn test_extract_genre() {
        let record = extract_genre(&row(json!({
            "id": "120a21cf-9097-479e-904a-13dd7198c1dd",
            "name": "Adventure",
            "description": null,
            "created": "2021-06-16T20:14:09.309735+00:00",
            "modified": "2021-06-16T20:14:09.309765+00:00"
        })))
        .unwrap();

        assert_eq!(record.kind(), EntityKind::Genre);
        assert_eq!(record.id().to_string(), "120a21cf-9097-479e-904a-13dd7198c1dd");
    }

    #[test]
    fn test_missing_required_field_is_validation_error() {
        let result = extract_genre(&row(json!({
            "id": "120a21cf-9097-479e-904a-13dd7198c1dd",
            "description": null,
            "created": "2021-06-16T20:14:09+00:00",
            "modified": "2021-06-16T20:14:09+00:00"
        })));

        let err = result.unwrap_err();
        assert!(matches!(err, PipelineError::ValidationError(_)));
        assert!(err.to_string().contains("120a21cf-9097-479e-904a-13dd7198c1dd"));
        assert!(err.to_string().contains("name"));
    }

    #[test]
    fn test_wrong_shape_is_validation_error() {
        let result = extract_film(&row(json!({
            "id": "3d825f60-9fff-4dfe-b294-1a45fa1e115d",
            "title": "Star Wars",
            "rating": "excellent",
            "type": "movie",
            "created": "2021-06-16T20:14:09+00:00",
            "modified": "2021-06-16T20:14:09+00:00"
        })));

        assert!(matches!(result, Err(PipelineError::ValidationError(_))));
    }

    #[test]
    fn test_missing_nullable_column_is_validation_error() {
        // "actors" and "description" may be null but must be selected.
        let result = extract_film(&row(json!({
            "id": "3d825f60-9fff-4dfe-b294-1a45fa1e115d",
            "title": "Star Wars",
            "rating": 8.6,
            "type": "movie",
            "created": "2021-06-16T20:14:09+00:00",
            "modified": "2021-06-16T20:14:09+00:00",
            "genres": null,
            "directors": null,
            "writers": null
        })));

        let err = result.unwrap_err();
        assert!(matches!(err, PipelineError::ValidationError(_)));
        assert!(err.to_string().contains("3d825f60-9fff-4dfe-b294-1a45fa1e115d"));
    }

    #[test]
    fn test_null_columns_are_accepted() {
        let record = extract_film(&row(json!({
            "id": "3d825f60-9fff-4dfe-b294-1a45fa1e115d",
            "title": "Star Wars",
            "description": null,
            "rating": null,
            "type": "movie",
            "created": "2021-06-16T20:14:09+00:00",
            "modified": "2021-06-16T20:14:09+00:00",
            "genres": null,
            "actors": null,
            "directors": null,
            "writers": null
        })))
        .unwrap();

        match record {
            SourceRecord::Film(film) => assert!(film.actors.is_none()),
            other => panic!("unexpected record {:?}", other),
        }
    }

    #[test]
    fn test_extract_person_with_films() {
        let record = extract_person(&row(json!({
            "id": "a5a8f573-3cee-4ccc-8a2b-91cb9f55250a",
            "full_name": "George Lucas",
            "modified": "2021-06-16T20:14:09+00:00",
            "films": [{
                "id": "3d825f60-9fff-4dfe-b294-1a45fa1e115d",
                "title": "Star Wars",
                "rating": 8.6,
                "roles": ["director", "writer"]
            }]
        })))
        .unwrap();

        match record {
            SourceRecord::Person(person) => {
                let films = person.films.unwrap();
                assert_eq!(films.len(), 1);
                assert_eq!(films[0].roles, vec!["director", "writer"]);
            }
            other => panic!("unexpected record {:?}", other),
        }
    }
}
