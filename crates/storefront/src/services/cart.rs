//! Shopper carts stored in the session.

use async_trait::async_trait;
use tower_sessions::Session;

use simea_core::cart::{CartStorage, CartStorageError, PersistentCart};

/// [`CartStorage`] backed by the shopper's `tower-sessions` session.
#[derive(Debug, Clone)]
pub struct SessionCartStorage {
    session: Session,
}

impl SessionCartStorage {
    #[must_use]
    pub const fn new(session: Session) -> Self {
        Self { session }
    }
}

#[async_trait]
impl CartStorage for SessionCartStorage {
    async fn load(&self, key: &str) -> Result<Option<String>, CartStorageError> {
        self.session
            .get::<String>(key)
            .await
            .map_err(|e| CartStorageError::Backend(e.to_string()))
    }

    async fn save(&self, key: &str, value: String) -> Result<(), CartStorageError> {
        self.session
            .insert(key, value)
            .await
            .map_err(|e| CartStorageError::Backend(e.to_string()))
    }
}

/// The cart of the session's shopper.
pub async fn session_cart(session: Session) -> PersistentCart<SessionCartStorage> {
    PersistentCart::restore(SessionCartStorage::new(session)).await
}
