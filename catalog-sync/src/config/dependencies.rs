//! Dependency initialization and wiring for the sync service.

use std::sync::Arc;
use tracing::{info, warn};

use crate::config::Settings;
use crate::SyncError;
use catalog_query::{FilmService, GenreService, PersonService};
use catalog_sync_pipeline::{BulkIndexer, LoaderConfig, Orchestrator, OrchestratorConfig, SyncTask};
use catalog_sync_repository::{
    Cache, InMemoryCache, JsonFileStore, OpenSearchClient, PostgresReader, PostgresReaderConfig,
    RedisCache, SearchIndexProvider,
};
use catalog_sync_shared::EntityKind;

/// Read-path services sharing the search client and the cache.
#[derive(Clone)]
pub struct QueryServices {
    pub films: FilmService,
    pub genres: GenreService,
    pub persons: PersonService,
}

impl QueryServices {
    pub fn new(search: Arc<dyn SearchIndexProvider>, cache: Arc<dyn Cache>) -> Self {
        Self {
            films: FilmService::new(search.clone(), cache.clone()),
            genres: GenreService::new(search.clone(), cache.clone()),
            persons: PersonService::new(search, cache),
        }
    }

    /// Connect the cache at `redis_url` and build the services on it.
    ///
    /// An unreachable cache degrades to an in-process cache.
    pub async fn connect(search: Arc<dyn SearchIndexProvider>, redis_url: &str) -> Self {
        let cache: Arc<dyn Cache> = match RedisCache::new(redis_url).await {
            Ok(cache) => Arc::new(cache),
            Err(e) => {
                warn!(error = %e, "Redis unavailable, using in-process cache");
                Arc::new(InMemoryCache::new())
            }
        };
        Self::new(search, cache)
    }
}

/// Container for all initialized dependencies.
pub struct Dependencies {
    /// The configured orchestrator ready to run.
    pub orchestrator: Orchestrator,
    /// One task per entity kind.
    pub tasks: Vec<SyncTask>,
    /// Search client shared by the indexer and any read API built on
    /// [`Dependencies::query_services`].
    pub search: Arc<dyn SearchIndexProvider>,
}

impl Dependencies {
    /// Initialize the sync dependencies from `settings`.
    ///
    /// The cache is not touched here; the sync never reads it.
    pub async fn new(settings: &Settings) -> Result<Self, SyncError> {
        info!(
            opensearch_url = %settings.opensearch_url,
            checkpoint_path = %settings.checkpoint_path.display(),
            page_size = settings.page_size,
            concurrent = settings.concurrent,
            "Initializing dependencies"
        );

        let search_client: Arc<dyn SearchIndexProvider> = Arc::new(
            OpenSearchClient::new(&settings.opensearch_url)
                .await
                .map_err(|e| SyncError::config(format!("Failed to create OpenSearch client: {}", e)))?,
        );

        let source = PostgresReader::new(PostgresReaderConfig {
            dsn: settings.postgres_dsn.clone(),
            retry: settings.retry.clone(),
        });
        if let Err(e) = source.connect().await {
            // The reader reconnects on every fetch, so the first pass may still succeed.
            warn!(error = %e, "PostgreSQL not reachable yet");
        }

        let checkpoints = JsonFileStore::new(&settings.checkpoint_path);

        let indexer = BulkIndexer::with_config(
            search_client.clone(),
            LoaderConfig {
                retry: settings.retry.clone(),
            },
        );

        let orchestrator = Orchestrator::with_config(
            Arc::new(source),
            Arc::new(checkpoints),
            indexer,
            OrchestratorConfig {
                page_size: settings.page_size,
                concurrent: settings.concurrent,
            },
        );

        let tasks = build_tasks(settings)?;

        Ok(Self {
            orchestrator,
            tasks,
            search: search_client,
        })
    }

    /// Read-path services over the synced indices, for a process that
    /// serves queries next to the sync loop.
    pub async fn query_services(&self, settings: &Settings) -> QueryServices {
        QueryServices::connect(self.search.clone(), &settings.redis_url).await
    }
}

/// One task per entity kind, with query templates from the override
/// directory when one is configured.
pub fn build_tasks(settings: &Settings) -> Result<Vec<SyncTask>, SyncError> {
    EntityKind::ALL
        .iter()
        .map(|kind| match &settings.query_dir {
            Some(dir) => SyncTask::for_kind_in_dir(*kind, dir)
                .map_err(|e| SyncError::config(format!("Query template for {}: {}", kind, e))),
            None => Ok(SyncTask::for_kind(*kind)),
        })
        .collect()
}
