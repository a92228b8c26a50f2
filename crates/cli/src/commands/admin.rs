//! Admin account commands.
//!
//! # Usage
//!
//! ```bash
//! simea-cli admin hash-password -p 'a long passphrase'
//! ADMIN_PASSWORD='a long passphrase' simea-cli admin hash-password
//! ```
//!
//! Put the printed value in `ADMIN_PASSWORD_HASH`.

use simea_storefront::services::auth::{self, AuthError};
use thiserror::Error;

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    /// No password given on the command line or in the environment.
    #[error("Missing password: pass --password or set ADMIN_PASSWORD")]
    MissingPassword,

    /// Hashing failed or the password was rejected.
    #[error(transparent)]
    Auth(#[from] AuthError),
}

/// Hash a password and print the PHC string.
///
/// # Errors
///
/// Returns an error if no password is given or it is too weak.
pub fn hash_password(password: Option<String>) -> Result<(), AdminError> {
    dotenvy::dotenv().ok();

    let password = password
        .or_else(|| std::env::var("ADMIN_PASSWORD").ok())
        .filter(|p| !p.is_empty())
        .ok_or(AdminError::MissingPassword)?;

    let hash = auth::hash_password(&password)?;

    #[allow(clippy::print_stdout)]
    {
        println!("{hash}");
    }

    tracing::info!("Set ADMIN_PASSWORD_HASH to the value above");
    Ok(())
}
