//! Shared application context

use crate::config::Config;
use crate::error::Result;
use crate::indexer::IndexingPipeline;
use crate::search::{IndexManager, SearchEngine, SearchService};
use crate::state::{create_store, ArchiveStore};
use crate::websocket::ConnectionRegistry;
use std::sync::Arc;
use std::time::Instant;

/// Adapters and long-lived components, built once at startup and handed to
/// every handler
pub struct AppContext {
    pub config: Config,
    pub store: Arc<dyn ArchiveStore>,
    pub engine: Arc<dyn SearchEngine>,
    pub pipeline: Arc<IndexingPipeline>,
    pub registry: ConnectionRegistry,
    pub search: SearchService,
    pub started: Instant,
}

impl AppContext {
    /// Open the configured store and search index and start the background
    /// tasks. Must run inside a Tokio runtime.
    pub fn build(config: Config) -> Result<Self> {
        let store = create_store(&config.state)?;
        let engine: Arc<dyn SearchEngine> = Arc::new(IndexManager::open(&config.search)?);

        Ok(Self::from_parts(config, store, engine))
    }

    /// Assemble a context around existing adapters
    pub fn from_parts(
        config: Config,
        store: Arc<dyn ArchiveStore>,
        engine: Arc<dyn SearchEngine>,
    ) -> Self {
        let pipeline = Arc::new(IndexingPipeline::spawn(
            store.clone(),
            engine.clone(),
            &config.indexer,
        ));
        let registry = ConnectionRegistry::spawn();
        let search = SearchService::new(
            store.clone(),
            engine.clone(),
            config.search.clone(),
            config.team.clone(),
        );

        Self {
            config,
            store,
            engine,
            pipeline,
            registry,
            search,
            started: Instant::now(),
        }
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started.elapsed().as_secs()
    }
}
