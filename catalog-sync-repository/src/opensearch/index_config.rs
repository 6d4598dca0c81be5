//! OpenSearch index configuration and mappings.
//!
//! This module defines the index settings and mappings for the catalog indices.

use serde_json::{json, Value};

use catalog_sync_shared::EntityKind;

/// Shared analysis settings: English and Russian stemming on text fields.
fn analysis_settings() -> Value {
    json!({
        "refresh_interval": "1s",
        "analysis": {
            "filter": {
                "english_stop": { "type": "stop", "stopwords": "_english_" },
                "english_stemmer": { "type": "stemmer", "language": "english" },
                "english_possessive_stemmer": { "type": "stemmer", "language": "possessive_english" },
                "russian_stop": { "type": "stop", "stopwords": "_russian_" },
                "russian_stemmer": { "type": "stemmer", "language": "russian" }
            },
            "analyzer": {
                "ru_en": {
                    "tokenizer": "standard",
                    "filter": [
                        "lowercase",
                        "english_stop",
                        "english_stemmer",
                        "english_possessive_stemmer",
                        "russian_stop",
                        "russian_stemmer"
                    ]
                }
            }
        }
    })
}

/// A nested `{id, name}` relation.
fn related_entity_mapping() -> Value {
    json!({
        "type": "nested",
        "dynamic": "strict",
        "properties": {
            "id": { "type": "keyword" },
            "name": { "type": "text", "analyzer": "ru_en" }
        }
    })
}

fn film_mappings() -> Value {
    json!({
        "dynamic": "strict",
        "properties": {
            "id": { "type": "keyword" },
            "imdb_rating": { "type": "float" },
            "title": {
                "type": "text",
                "analyzer": "ru_en",
                "fields": { "raw": { "type": "keyword" } }
            },
            "description": { "type": "text", "analyzer": "ru_en" },
            "genres": related_entity_mapping(),
            "actors_names": { "type": "text", "analyzer": "ru_en" },
            "directors_names": { "type": "text", "analyzer": "ru_en" },
            "writers_names": { "type": "text", "analyzer": "ru_en" },
            "actors": related_entity_mapping(),
            "directors": related_entity_mapping(),
            "writers": related_entity_mapping()
        }
    })
}

fn genre_mappings() -> Value {
    json!({
        "dynamic": "strict",
        "properties": {
            "id": { "type": "keyword" },
            "name": {
                "type": "text",
                "analyzer": "ru_en",
                "fields": { "raw": { "type": "keyword" } }
            },
            "description": { "type": "text", "analyzer": "ru_en" },
            "created": { "type": "keyword" },
            "modified": { "type": "keyword" }
        }
    })
}

fn person_mappings() -> Value {
    json!({
        "dynamic": "strict",
        "properties": {
            "id": { "type": "keyword" },
            "full_name": {
                "type": "text",
                "analyzer": "ru_en",
                "fields": { "raw": { "type": "keyword" } }
            },
            "films": {
                "type": "nested",
                "dynamic": "strict",
                "properties": {
                    "id": { "type": "keyword" },
                    "roles": { "type": "keyword" },
                    "title": { "type": "text", "analyzer": "ru_en" },
                    "imdb_rating": { "type": "float" }
                }
            }
        }
    })
}

/// Get the index settings and mappings for documents of `kind`.
///
/// Relations are `nested` so that a genre filter matches id and name of the
/// same embedded object. Genre timestamps are stored as keyword strings.
pub fn get_index_settings(kind: EntityKind) -> Value {
    let mappings = match kind {
        EntityKind::Film => film_mappings(),
        EntityKind::Genre => genre_mappings(),
        EntityKind::Person => person_mappings(),
    };

    json!({
        "settings": analysis_settings(),
        "mappings": mappings
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_film_index_settings_structure() {
        let settings = get_index_settings(EntityKind::Film);

        assert!(settings["settings"]["analysis"]["analyzer"]["ru_en"].is_object());

        let properties = &settings["mappings"]["properties"];
        assert_eq!(properties["id"]["type"], "keyword");
        assert_eq!(properties["imdb_rating"]["type"], "float");
        for relation in ["genres", "actors", "directors", "writers"] {
            assert_eq!(properties[relation]["type"], "nested", "{}", relation);
        }
        for names in ["actors_names", "directors_names", "writers_names"] {
            assert_eq!(properties[names]["type"], "text", "{}", names);
        }
    }

    #[test]
    fn test_genre_timestamps_are_strings() {
        let settings = get_index_settings(EntityKind::Genre);
        let properties = &settings["mappings"]["properties"];

        assert_eq!(properties["created"]["type"], "keyword");
        assert_eq!(properties["modified"]["type"], "keyword");
    }

    #[test]
    fn test_person_films_are_nested() {
        let settings = get_index_settings(EntityKind::Person);
        let films = &settings["mappings"]["properties"]["films"];

        assert_eq!(films["type"], "nested");
        assert_eq!(films["properties"]["roles"]["type"], "keyword");
    }
}
