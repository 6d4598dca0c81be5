//! Film queries.

use std::sync::Arc;

use tracing::instrument;

use crate::errors::QueryError;
use crate::read_through::{validate_page, ReadThrough, ServiceConfig};
use catalog_sync_repository::opensearch::queries::{build_film_list_request, build_search_request, field_match, Page};
use catalog_sync_repository::{cache_key, Cache, SearchIndexProvider, SortSpec};
use catalog_sync_shared::{EntityKind, FilmDocument};

/// The only field films can be sorted by.
pub const SORT_FIELD: &str = "imdb_rating";

/// Film lookups against the `movies` index.
#[derive(Clone)]
pub struct FilmService {
    reader: ReadThrough,
}

impl FilmService {
    pub fn new(search: Arc<dyn SearchIndexProvider>, cache: Arc<dyn Cache>) -> Self {
        Self::with_config(search, cache, ServiceConfig::default())
    }

    pub fn with_config(search: Arc<dyn SearchIndexProvider>, cache: Arc<dyn Cache>, config: ServiceConfig) -> Self {
        Self {
            reader: ReadThrough::new(search, cache, EntityKind::Film.default_index(), config),
        }
    }

    pub fn index(&self) -> &str {
        self.reader.index()
    }

    #[instrument(skip(self))]
    pub async fn get_by_id(&self, id: &str) -> Result<FilmDocument, QueryError> {
        self.reader.get_one(&cache_key(&["film", id]), id).await
    }

    /// A page of films, optionally restricted to one genre id.
    ///
    /// `sort` is `imdb_rating` or `-imdb_rating`.
    #[instrument(skip(self))]
    pub async fn list(&self, sort: &str, genre: Option<&str>, page: Page) -> Result<Vec<FilmDocument>, QueryError> {
        let page = validate_page(page)?;
        let sort_spec = parse_sort(sort)?;
        let (number, size) = (page.number.to_string(), page.size.to_string());
        let key = cache_key(&["films", number.as_str(), size.as_str(), sort, genre.unwrap_or_default()]);

        let request = build_film_list_request(Some(sort_spec), genre, page);
        self.reader.get_many(&key, &request).await
    }

    /// Films whose title matches `query`.
    #[instrument(skip(self))]
    pub async fn search(&self, query: &str, sort: &str, page: Page) -> Result<Vec<FilmDocument>, QueryError> {
        let page = validate_page(page)?;
        let sort_spec = parse_sort(sort)?;
        let (number, size) = (page.number.to_string(), page.size.to_string());
        let key = cache_key(&["films", "search", number.as_str(), size.as_str(), sort, query]);

        let request = build_search_request(field_match("title", query), Some(sort_spec), page);
        self.reader.get_many(&key, &request).await
    }
}

fn parse_sort(sort: &str) -> Result<SortSpec, QueryError> {
    match SortSpec::parse(sort) {
        Some(parsed) if parsed.field == SORT_FIELD => Ok(parsed),
        _ => Err(QueryError::invalid(format!(
            "unsupported sort {:?}, expected {} or -{}",
            sort, SORT_FIELD, SORT_FIELD
        ))),
    }
}
