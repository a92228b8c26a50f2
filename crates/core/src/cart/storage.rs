//! Write-through persistence for the cart.

use async_trait::async_trait;
use tracing::{debug, warn};

use super::{Cart, CartLine, CartLineId};
use crate::types::Product;

/// Storage key holding the JSON array of cart lines.
pub const CART_STORAGE_KEY: &str = "simea-cart";

/// Storage key holding the cart panel's open flag.
pub const CART_OPEN_STORAGE_KEY: &str = "simea-cart-open";

/// Errors from a cart storage backend.
#[derive(Debug, thiserror::Error)]
pub enum CartStorageError {
    /// The backend failed to read or write.
    #[error("cart storage backend error: {0}")]
    Backend(String),

    /// The cart could not be serialized.
    #[error("cart encode error: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Durable string key-value store scoped to one shopper.
#[async_trait]
pub trait CartStorage: Send + Sync {
    /// Read the value stored under `key`.
    async fn load(&self, key: &str) -> Result<Option<String>, CartStorageError>;

    /// Replace the value stored under `key`.
    async fn save(&self, key: &str, value: String) -> Result<(), CartStorageError>;
}

/// A [`Cart`] that persists its full line sequence after every mutation.
#[derive(Debug)]
pub struct PersistentCart<S> {
    cart: Cart,
    storage: S,
}

impl<S: CartStorage> PersistentCart<S> {
    /// Rehydrate the cart from `storage`.
    ///
    /// Missing, unreadable or corrupt data yields an empty cart.
    pub async fn restore(storage: S) -> Self {
        let lines = match storage.load(CART_STORAGE_KEY).await {
            Ok(Some(raw)) => decode_lines(&raw),
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(error = %e, "Failed to load cart, starting empty");
                Vec::new()
            }
        };
        let is_open = match storage.load(CART_OPEN_STORAGE_KEY).await {
            Ok(raw) => raw.is_some_and(|v| v == "true"),
            Err(e) => {
                warn!(error = %e, "Failed to load cart open flag");
                false
            }
        };

        debug!(lines = lines.len(), "Cart restored");
        Self {
            cart: Cart::from_lines(lines, is_open),
            storage,
        }
    }

    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    /// See [`Cart::add_line`].
    ///
    /// # Errors
    ///
    /// Returns an error if the cart could not be persisted.
    pub async fn add_line(
        &mut self,
        product: &Product,
        size: &str,
        color: &str,
        quantity: u32,
    ) -> Result<CartLineId, CartStorageError> {
        let id = self.cart.add_line(product, size, color, quantity);
        self.persist().await?;
        Ok(id)
    }

    /// See [`Cart::update_quantity`].
    ///
    /// # Errors
    ///
    /// Returns an error if the cart could not be persisted.
    pub async fn update_quantity(
        &mut self,
        id: &CartLineId,
        quantity: i64,
    ) -> Result<bool, CartStorageError> {
        let changed = self.cart.update_quantity(id, quantity);
        if changed {
            self.persist_lines().await?;
        }
        Ok(changed)
    }

    /// See [`Cart::remove_line`].
    ///
    /// # Errors
    ///
    /// Returns an error if the cart could not be persisted.
    pub async fn remove_line(&mut self, id: &CartLineId) -> Result<bool, CartStorageError> {
        let removed = self.cart.remove_line(id);
        self.persist_lines().await?;
        Ok(removed)
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart could not be persisted.
    pub async fn clear(&mut self) -> Result<(), CartStorageError> {
        self.cart.clear();
        self.persist_lines().await
    }

    /// Open or close the cart panel.
    ///
    /// # Errors
    ///
    /// Returns an error if the flag could not be persisted.
    pub async fn set_open(&mut self, is_open: bool) -> Result<(), CartStorageError> {
        self.cart.set_open(is_open);
        self.persist_open().await
    }

    async fn persist(&self) -> Result<(), CartStorageError> {
        self.persist_lines().await?;
        self.persist_open().await
    }

    async fn persist_lines(&self) -> Result<(), CartStorageError> {
        let raw = serde_json::to_string(self.cart.lines())?;
        self.storage.save(CART_STORAGE_KEY, raw).await
    }

    async fn persist_open(&self) -> Result<(), CartStorageError> {
        let raw = if self.cart.is_open() { "true" } else { "false" };
        self.storage.save(CART_OPEN_STORAGE_KEY, raw.to_owned()).await
    }
}

fn decode_lines(raw: &str) -> Vec<CartLine> {
    match serde_json::from_str::<Vec<CartLine>>(raw) {
        Ok(lines) => lines,
        Err(e) => {
            warn!(error = %e, "Discarding corrupt persisted cart");
            Vec::new()
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use rust_decimal::Decimal;

    use super::*;
    use crate::types::{PriceSchedule, ProductFields, ProductId};

    #[derive(Clone, Default)]
    struct MapStorage(Arc<Mutex<HashMap<String, String>>>);

    #[async_trait]
    impl CartStorage for MapStorage {
        async fn load(&self, key: &str) -> Result<Option<String>, CartStorageError> {
            Ok(self.0.lock().unwrap().get(key).cloned())
        }

        async fn save(&self, key: &str, value: String) -> Result<(), CartStorageError> {
            self.0.lock().unwrap().insert(key.to_owned(), value);
            Ok(())
        }
    }

    fn product() -> Product {
        Product::from_fields(
            ProductId::Seed(3),
            ProductFields {
                name: "Bombacha Colaless".to_owned(),
                description: String::new(),
                image: String::new(),
                category: "bombachas".to_owned(),
                sizes: vec!["M".to_owned()],
                colors: vec!["Rosa".to_owned()],
                stock: 50,
                pricing: PriceSchedule::new(
                    Decimal::from(800),
                    Decimal::from(700),
                    Decimal::from(600),
                ),
            },
        )
    }

    #[tokio::test]
    async fn test_mutations_survive_restore() {
        let storage = MapStorage::default();
        let mut cart = PersistentCart::restore(storage.clone()).await;
        let id = cart.add_line(&product(), "M", "Rosa", 2).await.unwrap();
        cart.update_quantity(&id, 6).await.unwrap();

        let restored = PersistentCart::restore(storage).await;
        assert_eq!(restored.cart().lines().len(), 1);
        assert_eq!(restored.cart().lines()[0].quantity, 6);
        assert!(restored.cart().is_open());
    }

    #[tokio::test]
    async fn test_corrupt_data_restores_empty() {
        let storage = MapStorage::default();
        storage
            .save(CART_STORAGE_KEY, "{not json".to_owned())
            .await
            .unwrap();

        let cart = PersistentCart::restore(storage).await;
        assert!(cart.cart().is_empty());
    }

    #[tokio::test]
    async fn test_clear_persists_empty_sequence() {
        let storage = MapStorage::default();
        let mut cart = PersistentCart::restore(storage.clone()).await;
        cart.add_line(&product(), "M", "Rosa", 1).await.unwrap();
        cart.clear().await.unwrap();

        let raw = storage.load(CART_STORAGE_KEY).await.unwrap();
        assert_eq!(raw.as_deref(), Some("[]"));
    }
}
