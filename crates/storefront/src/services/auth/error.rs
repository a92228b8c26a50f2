//! Authentication error types.

use thiserror::Error;

/// Errors that can occur during admin authentication.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Wrong login or password. Deliberately does not say which.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Password too weak to be hashed for the admin account.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}
