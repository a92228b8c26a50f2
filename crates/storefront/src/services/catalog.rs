//! The displayed catalog.
//!
//! Wraps a [`CatalogStore`] with a `moka` cache holding the product list the
//! storefront shows. When the store is empty or unreachable the built-in seed
//! catalog is shown instead.
//!
//! Admin edits go to the store first and are then applied to the cached list.
//! Seed products have no remote identity: editing one creates it in the store
//! (the displayed entry is replaced by the persisted product), deleting one
//! only drops it from the cached list until the next reload.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use moka::future::Cache;
use tracing::{debug, info, instrument, warn};

use simea_core::catalog::{CatalogError, CatalogRefresh, CatalogStore, seed_catalog};
use simea_core::{Product, ProductDraft, ProductId};

const CATALOG_CACHE_KEY: &str = "catalog";

/// Cached, process-wide view of the catalog.
#[derive(Clone)]
pub struct CatalogService {
    inner: Arc<CatalogServiceInner>,
}

struct CatalogServiceInner {
    store: Arc<dyn CatalogStore>,
    cache: Cache<&'static str, Arc<Vec<Product>>>,
}

impl CatalogService {
    /// Create a catalog service whose cached list expires after `ttl`.
    #[must_use]
    pub fn new(store: Arc<dyn CatalogStore>, ttl: Duration) -> Self {
        let cache = Cache::builder().max_capacity(1).time_to_live(ttl).build();

        Self {
            inner: Arc::new(CatalogServiceInner { store, cache }),
        }
    }

    /// The underlying store (used by checkout for stock decrements).
    #[must_use]
    pub fn store(&self) -> &dyn CatalogStore {
        self.inner.store.as_ref()
    }

    /// The displayed product list, newest first.
    pub async fn products(&self) -> Arc<Vec<Product>> {
        if let Some(products) = self.inner.cache.get(CATALOG_CACHE_KEY).await {
            debug!("Cache hit for catalog");
            return products;
        }
        self.reload().await
    }

    /// Products in `category` (`todos` for all).
    pub async fn by_category(&self, category: &str) -> Vec<Product> {
        self.products()
            .await
            .iter()
            .filter(|p| p.in_category(category))
            .cloned()
            .collect()
    }

    /// A single displayed product.
    pub async fn product(&self, id: ProductId) -> Option<Product> {
        self.products().await.iter().find(|p| p.id == id).cloned()
    }

    /// Re-read the catalog from the store, falling back to the seed catalog.
    #[instrument(skip(self))]
    pub async fn reload(&self) -> Arc<Vec<Product>> {
        let products = match self.inner.store.fetch_all().await {
            Ok(products) if !products.is_empty() => products,
            Ok(_) => {
                info!("Catalog store is empty, showing seed catalog");
                seed_catalog()
            }
            Err(e) => {
                warn!(error = %e, "Failed to load catalog, showing seed catalog");
                seed_catalog()
            }
        };

        let products = Arc::new(products);
        self.inner
            .cache
            .insert(CATALOG_CACHE_KEY, Arc::clone(&products))
            .await;
        products
    }

    /// Create a product from an admin draft.
    ///
    /// # Errors
    ///
    /// Returns the store error if the product could not be created.
    #[instrument(skip(self, draft))]
    pub async fn create(&self, draft: &ProductDraft) -> Result<Product, CatalogError> {
        let product = self.inner.store.create(draft.sanitize()).await?;

        let created = product.clone();
        self.modify(move |products| {
            // A reload triggered by `modify` may already hold it.
            products.retain(|p| p.id != created.id);
            products.insert(0, created);
        })
        .await;
        Ok(product)
    }

    /// Replace a product's fields from an admin draft.
    ///
    /// A seed product is created in the store and its displayed entry is
    /// replaced by the persisted product.
    ///
    /// # Errors
    ///
    /// Returns the store error if the write failed.
    #[instrument(skip(self, draft))]
    pub async fn update(&self, id: ProductId, draft: &ProductDraft) -> Result<Product, CatalogError> {
        let fields = draft.sanitize();

        let updated = if id.is_persisted() {
            self.inner.store.update(id, fields.clone()).await?;
            let previous = self.product(id).await;
            Product {
                created_at: previous.and_then(|p| p.created_at),
                updated_at: Some(Utc::now()),
                ..Product::from_fields(id, fields)
            }
        } else {
            let created = self.inner.store.create(fields).await?;
            info!(seed_id = %id, product_id = %created.id, "Seed product persisted");
            created
        };

        let replacement = updated.clone();
        self.modify(move |products| {
            products.retain(|p| p.id == id || p.id != replacement.id);
            if let Some(slot) = products.iter_mut().find(|p| p.id == id) {
                *slot = replacement;
            } else {
                products.insert(0, replacement);
            }
        })
        .await;
        Ok(updated)
    }

    /// Delete a product. Seed products are only removed from the displayed list.
    ///
    /// # Errors
    ///
    /// Returns the store error if the delete failed.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: ProductId) -> Result<(), CatalogError> {
        if id.is_persisted() {
            self.inner.store.delete(id).await?;
        }
        self.modify(move |products| products.retain(|p| p.id != id))
            .await;
        Ok(())
    }

    /// Apply a change to the cached product list.
    async fn modify(&self, change: impl FnOnce(&mut Vec<Product>) + Send) {
        let current = self.products().await;
        let mut next = current.as_ref().clone();
        change(&mut next);
        self.inner
            .cache
            .insert(CATALOG_CACHE_KEY, Arc::new(next))
            .await;
    }
}

#[async_trait]
impl CatalogRefresh for CatalogService {
    async fn refresh(&self) {
        self.reload().await;
    }
}
