//! Database migration commands.
//!
//! # Usage
//!
//! ```bash
//! simea-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! # Migration Files
//!
//! Schema migrations live in `crates/storefront/migrations/`. The session
//! table is owned by `tower-sessions-sqlx-store` and created by its own
//! migration.

use thiserror::Error;
use tower_sessions_sqlx_store::PostgresStore;

use super::{DatabaseCommandError, connect};

/// Errors that can occur while migrating.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error(transparent)]
    Connect(#[from] DatabaseCommandError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Run storefront database migrations.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a migration fails.
pub async fn storefront() -> Result<(), MigrationError> {
    let pool = connect().await?;

    tracing::info!("Running storefront migrations...");
    sqlx::migrate!("../storefront/migrations").run(&pool).await?;

    tracing::info!("Creating session table...");
    PostgresStore::new(pool).migrate().await?;

    tracing::info!("Storefront migrations complete!");
    Ok(())
}
