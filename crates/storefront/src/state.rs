//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use simea_core::catalog::CatalogStore;
use simea_core::settings::SettingsStore;

use crate::config::StorefrontConfig;
use crate::db::{PgCatalogStore, PgSettingsStore};
use crate::services::{CatalogService, SettingsService};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: PgPool,
    catalog: CatalogService,
    settings: SettingsService,
}

impl AppState {
    /// Create application state backed by `PostgreSQL` stores.
    #[must_use]
    pub fn new(config: StorefrontConfig, pool: PgPool) -> Self {
        let catalog_store = Arc::new(PgCatalogStore::new(pool.clone()));
        let settings_store = Arc::new(PgSettingsStore::new(pool.clone()));
        Self::from_parts(config, pool, catalog_store, settings_store)
    }

    /// Create application state over arbitrary stores.
    ///
    /// The pool is only used by the readiness probe.
    #[must_use]
    pub fn from_parts(
        config: StorefrontConfig,
        pool: PgPool,
        catalog_store: Arc<dyn CatalogStore>,
        settings_store: Arc<dyn SettingsStore>,
    ) -> Self {
        let catalog = CatalogService::new(catalog_store, config.catalog_cache_ttl);
        let settings = SettingsService::new(settings_store, config.catalog_cache_ttl);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                catalog,
                settings,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the catalog service.
    #[must_use]
    pub fn catalog(&self) -> &CatalogService {
        &self.inner.catalog
    }

    /// Get a reference to the settings service.
    #[must_use]
    pub fn settings(&self) -> &SettingsService {
        &self.inner.settings
    }
}
