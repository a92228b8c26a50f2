//! Cached store settings.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use tracing::{debug, instrument, warn};

use simea_core::settings::{SettingsError, SettingsStore};
use simea_core::{StoreSettings, StoreSettingsInput};

const SETTINGS_CACHE_KEY: &str = "store";

/// Settings reader/writer shared by the checkout and admin routes.
#[derive(Clone)]
pub struct SettingsService {
    inner: Arc<SettingsServiceInner>,
}

struct SettingsServiceInner {
    store: Arc<dyn SettingsStore>,
    cache: Cache<&'static str, StoreSettings>,
}

impl SettingsService {
    #[must_use]
    pub fn new(store: Arc<dyn SettingsStore>, ttl: Duration) -> Self {
        let cache = Cache::builder().max_capacity(1).time_to_live(ttl).build();

        Self {
            inner: Arc::new(SettingsServiceInner { store, cache }),
        }
    }

    /// Current settings. Falls back to the defaults (uncached) when the
    /// store cannot be read.
    #[instrument(skip(self))]
    pub async fn get(&self) -> StoreSettings {
        if let Some(settings) = self.inner.cache.get(SETTINGS_CACHE_KEY).await {
            debug!("Cache hit for settings");
            return settings;
        }

        match self.inner.store.get().await {
            Ok(settings) => {
                self.inner
                    .cache
                    .insert(SETTINGS_CACHE_KEY, settings.clone())
                    .await;
                settings
            }
            Err(e) => {
                warn!(error = %e, "Failed to load settings, using defaults");
                StoreSettings::default()
            }
        }
    }

    /// Replace the settings document.
    ///
    /// # Errors
    ///
    /// Returns the store error if the write failed.
    #[instrument(skip_all)]
    pub async fn update(&self, input: StoreSettingsInput) -> Result<StoreSettings, SettingsError> {
        let settings = self.inner.store.update(input).await?;
        self.inner
            .cache
            .insert(SETTINGS_CACHE_KEY, settings.clone())
            .await;
        Ok(settings)
    }
}
