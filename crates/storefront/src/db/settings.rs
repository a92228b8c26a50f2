//! Settings documents stored as JSONB, keyed by name.
//!
//! The store settings live under the `store` key.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value as JsonValue;
use sqlx::PgPool;

use simea_core::settings::{SettingsError, SettingsStore};
use simea_core::{StoreSettings, StoreSettingsInput};

use super::RepositoryError;

/// Key of the store settings document.
pub const STORE_SETTINGS_KEY: &str = "store";

/// Read a settings document.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub async fn get_document(pool: &PgPool, key: &str) -> Result<Option<JsonValue>, RepositoryError> {
    let value = sqlx::query_scalar::<_, JsonValue>("SELECT value FROM store_settings WHERE key = $1")
        .bind(key)
        .fetch_optional(pool)
        .await?;
    Ok(value)
}

/// Replace a settings document.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub async fn put_document(pool: &PgPool, key: &str, value: &JsonValue) -> Result<(), RepositoryError> {
    sqlx::query(
        r"
        INSERT INTO store_settings (key, value)
        VALUES ($1, $2)
        ON CONFLICT (key) DO UPDATE SET value = $2, updated_at = NOW()
        ",
    )
    .bind(key)
    .bind(value)
    .execute(pool)
    .await?;
    Ok(())
}

/// Insert a settings document unless one already exists.
async fn insert_document_if_absent(
    pool: &PgPool,
    key: &str,
    value: &JsonValue,
) -> Result<(), RepositoryError> {
    sqlx::query(
        r"
        INSERT INTO store_settings (key, value)
        VALUES ($1, $2)
        ON CONFLICT (key) DO NOTHING
        ",
    )
    .bind(key)
    .bind(value)
    .execute(pool)
    .await?;
    Ok(())
}

fn encode(settings: &StoreSettings) -> Result<JsonValue, RepositoryError> {
    serde_json::to_value(settings)
        .map_err(|e| RepositoryError::DataCorruption(format!("settings encode failed: {e}")))
}

fn decode(value: JsonValue) -> Result<StoreSettings, RepositoryError> {
    serde_json::from_value(value)
        .map_err(|e| RepositoryError::DataCorruption(format!("invalid settings document: {e}")))
}

/// Settings store backed by the `store_settings` table.
#[derive(Debug, Clone)]
pub struct PgSettingsStore {
    pool: PgPool,
}

impl PgSettingsStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SettingsStore for PgSettingsStore {
    #[tracing::instrument(skip(self))]
    async fn get(&self) -> Result<StoreSettings, SettingsError> {
        if let Some(value) = get_document(&self.pool, STORE_SETTINGS_KEY).await? {
            return Ok(decode(value)?);
        }

        let defaults = StoreSettings {
            updated_at: Some(Utc::now()),
            ..StoreSettings::default()
        };
        insert_document_if_absent(&self.pool, STORE_SETTINGS_KEY, &encode(&defaults)?).await?;
        tracing::info!("Default store settings created");

        // Another request may have won the insert.
        match get_document(&self.pool, STORE_SETTINGS_KEY).await? {
            Some(value) => Ok(decode(value)?),
            None => Ok(defaults),
        }
    }

    #[tracing::instrument(skip_all)]
    async fn update(&self, input: StoreSettingsInput) -> Result<StoreSettings, SettingsError> {
        let settings = input.into_settings(Utc::now());
        put_document(&self.pool, STORE_SETTINGS_KEY, &encode(&settings)?).await?;
        tracing::info!(store_name = %settings.store_name, "Store settings updated");
        Ok(settings)
    }
}
