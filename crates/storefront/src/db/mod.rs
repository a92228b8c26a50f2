//! Database operations for the storefront `PostgreSQL` database.
//!
//! ## Tables
//!
//! - `products` - The catalog
//! - `store_settings` - Settings documents (one row per key)
//! - `tower_sessions.session` - Shopper and admin sessions
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p simea-cli -- migrate
//! ```

pub mod products;
pub mod settings;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use simea_core::catalog::CatalogError;
use simea_core::settings::SettingsError;

pub use products::PgCatalogStore;
pub use settings::PgSettingsStore;

/// Errors from repository operations.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,
}

impl From<RepositoryError> for CatalogError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::DataCorruption(msg) => Self::Decode(msg),
            other => Self::Network(other.to_string()),
        }
    }
}

impl From<RepositoryError> for SettingsError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::DataCorruption(msg) => Self::Decode(msg),
            other => Self::Network(other.to_string()),
        }
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
