//! Genre queries.

use std::sync::Arc;

use tracing::instrument;

use crate::errors::QueryError;
use crate::read_through::{validate_page, ReadThrough, ServiceConfig};
use catalog_sync_repository::opensearch::queries::{build_search_request, match_all, Page};
use catalog_sync_repository::{cache_key, Cache, SearchIndexProvider};
use catalog_sync_shared::{EntityKind, GenreDocument};

/// Genre lookups against the `genres` index.
#[derive(Clone)]
pub struct GenreService {
    reader: ReadThrough,
}

impl GenreService {
    pub fn new(search: Arc<dyn SearchIndexProvider>, cache: Arc<dyn Cache>) -> Self {
        Self::with_config(search, cache, ServiceConfig::default())
    }

    pub fn with_config(search: Arc<dyn SearchIndexProvider>, cache: Arc<dyn Cache>, config: ServiceConfig) -> Self {
        Self {
            reader: ReadThrough::new(search, cache, EntityKind::Genre.default_index(), config),
        }
    }

    #[instrument(skip(self))]
    pub async fn get_by_id(&self, id: &str) -> Result<GenreDocument, QueryError> {
        self.reader.get_one(&cache_key(&["genre", id]), id).await
    }

    #[instrument(skip(self))]
    pub async fn list(&self, page: Page) -> Result<Vec<GenreDocument>, QueryError> {
        let page = validate_page(page)?;
        let (number, size) = (page.number.to_string(), page.size.to_string());
        let key = cache_key(&["genres", number.as_str(), size.as_str()]);

        self.reader
            .get_many(&key, &build_search_request(match_all(), None, page))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FakeIndex;
    use catalog_sync_repository::InMemoryCache;
    use serde_json::json;

    fn genre(id: &str, name: &str) -> serde_json::Value {
        json!({
            "id": id,
            "name": name,
            "description": null,
            "created": "2021-06-16T20:14:09+00:00",
            "modified": "2021-06-16T20:14:09+00:00"
        })
    }

    #[tokio::test]
    async fn test_list_pages() {
        let index = Arc::new(FakeIndex::with(vec![genre("g1", "Action"), genre("g2", "Drama"), genre("g3", "Comedy")]));
        let cache = Arc::new(InMemoryCache::new());
        let service = GenreService::new(index.clone(), cache.clone());

        let second_page = service.list(Page::new(2, 2)).await.unwrap();

        assert_eq!(second_page.len(), 1);
        assert_eq!(second_page[0].name, "Comedy");
        let request = index.last_request.lock().await.clone().unwrap();
        assert_eq!(request.from, 2);
        assert!(request.sort.is_none());
        assert!(cache.get("genres_2_2").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_get_by_id() {
        let index = Arc::new(FakeIndex::with(vec![genre("g1", "Action")]));
        let service = GenreService::new(index, Arc::new(InMemoryCache::new()));

        assert_eq!(service.get_by_id("g1").await.unwrap().name, "Action");
        assert!(service.get_by_id("g9").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_invalid_page() {
        let service = GenreService::new(Arc::new(FakeIndex::default()), Arc::new(InMemoryCache::new()));
        assert!(matches!(
            service.list(Page::new(0, 50)).await,
            Err(QueryError::InvalidRequest(_))
        ));
    }
}
