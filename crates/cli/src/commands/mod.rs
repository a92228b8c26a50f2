//! CLI subcommands.

pub mod admin;
pub mod migrate;
pub mod seed;

use secrecy::SecretString;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

/// Environment variable holding the storefront database URL.
pub const DATABASE_URL_VAR: &str = "STOREFRONT_DATABASE_URL";

/// Errors from commands that talk to the database.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseCommandError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Read the database URL (falling back to `DATABASE_URL`).
pub fn database_url() -> Result<SecretString, DatabaseCommandError> {
    dotenvy::dotenv().ok();

    std::env::var(DATABASE_URL_VAR)
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| DatabaseCommandError::MissingEnvVar(DATABASE_URL_VAR))
}

/// Connect with a small pool suited to one-off commands.
pub async fn connect() -> Result<PgPool, DatabaseCommandError> {
    use secrecy::ExposeSecret;

    let url = database_url()?;
    tracing::info!("Connecting to storefront database...");
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(url.expose_secret())
        .await?;
    Ok(pool)
}
