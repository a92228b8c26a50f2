//! Settings store interface.

use async_trait::async_trait;

use crate::types::{StoreSettings, StoreSettingsInput};

/// Errors from the settings store.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("settings store error: {0}")]
    Network(String),

    #[error("corrupt settings document: {0}")]
    Decode(String),
}

/// The single settings document.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Read the settings, writing the default record first if none exists.
    async fn get(&self) -> Result<StoreSettings, SettingsError>;

    /// Replace the whole document, stamping it with the current time.
    async fn update(&self, input: StoreSettingsInput) -> Result<StoreSettings, SettingsError>;
}
