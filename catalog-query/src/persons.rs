//! Person queries.

use std::sync::Arc;

use tracing::instrument;

use crate::errors::QueryError;
use crate::read_through::{validate_page, ReadThrough, ServiceConfig};
use catalog_sync_repository::opensearch::queries::{build_search_request, field_match, Page};
use catalog_sync_repository::{cache_key, Cache, SearchIndexProvider};
use catalog_sync_shared::{EntityKind, PersonDocument};

/// Person lookups against the `persons` index.
#[derive(Clone)]
pub struct PersonService {
    reader: ReadThrough,
}

impl PersonService {
    pub fn new(search: Arc<dyn SearchIndexProvider>, cache: Arc<dyn Cache>) -> Self {
        Self::with_config(search, cache, ServiceConfig::default())
    }

    pub fn with_config(search: Arc<dyn SearchIndexProvider>, cache: Arc<dyn Cache>, config: ServiceConfig) -> Self {
        Self {
            reader: ReadThrough::new(search, cache, EntityKind::Person.default_index(), config),
        }
    }

    #[instrument(skip(self))]
    pub async fn get_by_id(&self, id: &str) -> Result<PersonDocument, QueryError> {
        self.reader.get_one(&cache_key(&["person", id]), id).await
    }

    /// People whose full name matches `query`.
    #[instrument(skip(self))]
    pub async fn search(&self, query: &str, page: Page) -> Result<Vec<PersonDocument>, QueryError> {
        let page = validate_page(page)?;
        let (number, size) = (page.number.to_string(), page.size.to_string());
        let key = cache_key(&["persons", "search", number.as_str(), size.as_str(), query]);

        self.reader
            .get_many(&key, &build_search_request(field_match("full_name", query), None, page))
            .await
    }
}
