//! Application context shared by all request handlers (via Axum state).

use std::sync::Arc;

use rh_core::config::Config;
use rh_db::pool::DbPool;

use crate::catalog::{CatalogStore, DbCatalog};

/// Cheaply cloneable bundle of the server's shared, read-only state.
#[derive(Clone)]
pub struct AppContext {
    /// Database connection pool.
    pub db: DbPool,
    /// Immutable application configuration snapshot.
    pub config: Arc<Config>,
    /// Resolver used by the streaming route.
    pub catalog: Arc<dyn CatalogStore>,
}

impl AppContext {
    /// Build a context whose catalog is the database itself.
    pub fn new(db: DbPool, config: Config) -> Self {
        let catalog: Arc<dyn CatalogStore> = Arc::new(DbCatalog::new(db.clone()));
        Self {
            db,
            config: Arc::new(config),
            catalog,
        }
    }

    /// Replace the catalog, e.g. with an in-memory one in tests.
    pub fn with_catalog(mut self, catalog: Arc<dyn CatalogStore>) -> Self {
        self.catalog = catalog;
        self
    }
}
