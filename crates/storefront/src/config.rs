//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront
//! - `ADMIN_EMAIL` - Login for the admin surface
//! - `ADMIN_PASSWORD_HASH` - Argon2 PHC hash of the admin password (see `simea-cli admin hash-password`)
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `CATALOG_CACHE_TTL_SECS` - How long the displayed catalog is cached (default: 300)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate (default: 0.0)

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use argon2::password_hash::PasswordHash;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

/// Domain appended to admin logins given without one.
pub const ADMIN_LOGIN_DOMAIN: &str = "simea.com";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Admin credentials
    pub admin: AdminConfig,
    /// Time-to-live of the cached catalog
    pub catalog_cache_ttl: Duration,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g. "production")
    pub sentry_environment: Option<String>,
    /// Fraction of errors sent to Sentry
    pub sentry_sample_rate: f32,
    /// Fraction of transactions sent to Sentry
    pub sentry_traces_sample_rate: f32,
}

/// Admin credentials.
///
/// Implements `Debug` manually to redact the password hash.
#[derive(Clone)]
pub struct AdminConfig {
    /// Admin login email
    pub email: String,
    /// Argon2 PHC string of the admin password
    pub password_hash: SecretString,
}

impl std::fmt::Debug for AdminConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminConfig")
            .field("email", &self.email)
            .field("password_hash", &"[REDACTED]")
            .finish()
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid, or
    /// if the admin password hash is not an argon2 PHC string.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("STOREFRONT_DATABASE_URL")?;
        let host = parse_env("STOREFRONT_HOST", "127.0.0.1")?;
        let port = parse_env("STOREFRONT_PORT", "3000")?;
        let base_url = get_required_env("STOREFRONT_BASE_URL")?;
        validate_base_url(&base_url, "STOREFRONT_BASE_URL")?;

        let admin = AdminConfig::from_env()?;
        let catalog_cache_ttl = Duration::from_secs(parse_env("CATALOG_CACHE_TTL_SECS", "300")?);

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            admin,
            catalog_cache_ttl,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: parse_env("SENTRY_SAMPLE_RATE", "1.0")?,
            sentry_traces_sample_rate: parse_env("SENTRY_TRACES_SAMPLE_RATE", "0.0")?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should carry the `Secure` attribute.
    #[must_use]
    pub fn is_https(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

impl AdminConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let email = normalize_admin_login(&get_required_env("ADMIN_EMAIL")?);
        let password_hash = get_required_env("ADMIN_PASSWORD_HASH")?;
        validate_password_hash(&password_hash, "ADMIN_PASSWORD_HASH")?;

        Ok(Self {
            email,
            password_hash: SecretString::from(password_hash),
        })
    }

    /// Whether `login` names the admin account.
    ///
    /// Logins without a domain are matched as `login@simea.com`.
    #[must_use]
    pub fn matches_login(&self, login: &str) -> bool {
        normalize_admin_login(login) == self.email
    }

    /// Expose the stored hash for verification.
    #[must_use]
    pub fn password_hash(&self) -> &str {
        self.password_hash.expose_secret()
    }
}

/// Lowercase a login and append the store domain to bare usernames.
#[must_use]
pub fn normalize_admin_login(login: &str) -> String {
    let login = login.trim().to_lowercase();
    if login.contains('@') {
        login
    } else {
        format!("{login}@{ADMIN_LOGIN_DOMAIN}")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable, falling back to `default` when unset.
fn parse_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(key, default)
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Validate that the base URL is an absolute http(s) URL.
fn validate_base_url(value: &str, var_name: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidEnvVar(var_name.to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    Ok(())
}

/// Validate that a value is an argon2 PHC hash rather than a plain password.
fn validate_password_hash(value: &str, var_name: &str) -> Result<(), ConfigError> {
    let hash = PasswordHash::new(value).map_err(|_| {
        ConfigError::InsecureSecret(
            var_name.to_string(),
            "must be an argon2 PHC string, not a plain password".to_string(),
        )
    })?;
    if !hash.algorithm.as_str().starts_with("argon2") {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!("unsupported hash algorithm '{}'", hash.algorithm),
        ));
    }
    Ok(())
}
