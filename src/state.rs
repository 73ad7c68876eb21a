//! Application state for Coverlay.
//!
//! Contains the shared state that is passed to all handlers.

use std::path::PathBuf;

use crate::db::DbPool;
use crate::services::{CacheService, CoverageService, GitSyncService};
use crate::{config, Result};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: DbPool,
    /// Cache partition access.
    pub cache: CacheService,
    /// Coverage hit-set lookup.
    pub coverage: CoverageService,
    /// Git mirror sync service.
    pub git: GitSyncService,
    /// Directory under which project mirrors are created.
    pub repo_root: PathBuf,
}

impl AppState {
    /// Create a new application state, initializing all services.
    pub async fn new() -> Result<Self> {
        let config = config::config();

        // Initialize database
        let db = crate::db::init_pool(&config.database.path).await?;

        // Initialize database schema
        crate::db::initialize_schema(&db).await?;

        // Initialize services
        let cache = CacheService::new(config.cache.url.clone());
        let coverage = CoverageService::new(cache.clone());
        let git = GitSyncService::new();

        Ok(Self {
            db,
            cache,
            coverage,
            git,
            repo_root: PathBuf::from(&config.repo.root),
        })
    }
}
