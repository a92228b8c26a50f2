//! Unified error handling with Sentry integration.
//!
//! All route handlers return `Result<T, AppError>`. Server-side failures are
//! captured to Sentry before a JSON error body is sent to the client.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use simea_core::cart::CartStorageError;
use simea_core::catalog::CatalogError;
use simea_core::settings::SettingsError;

use crate::db::RepositoryError;
use crate::services::auth::AuthError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Catalog store operation failed.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Settings store operation failed.
    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Cart could not be persisted.
    #[error("Cart error: {0}")]
    Cart(#[from] CartStorageError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Session could not be read or written.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Caller is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Catalog(CatalogError::NotFound(_)) | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Catalog(CatalogError::Network(_)) | Self::Settings(SettingsError::Network(_)) => {
                StatusCode::BAD_GATEWAY
            }
            Self::Catalog(CatalogError::Decode(_))
            | Self::Settings(SettingsError::Decode(_))
            | Self::Database(_)
            | Self::Cart(_)
            | Self::Session(_)
            | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Auth(AuthError::InvalidCredentials) | Self::Unauthorized(_) => {
                StatusCode::UNAUTHORIZED
            }
            Self::Auth(AuthError::WeakPassword(_)) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Auth(AuthError::PasswordHash) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    // Don't expose internal error details to clients
    fn client_message(&self) -> String {
        match self {
            Self::Catalog(CatalogError::NotFound(id)) => format!("Product {id} not found"),
            Self::Catalog(CatalogError::Network(_)) | Self::Settings(SettingsError::Network(_)) => {
                "Store backend unavailable".to_string()
            }
            Self::Auth(AuthError::InvalidCredentials) => "Invalid credentials".to_string(),
            Self::Auth(AuthError::WeakPassword(msg)) => msg.clone(),
            Self::NotFound(what) => format!("{what} not found"),
            Self::Unauthorized(msg) | Self::BadRequest(msg) => msg.clone(),
            _ => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        (status, Json(json!({ "error": self.client_message() }))).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context for the logged-in admin.
pub fn set_sentry_user(email: &str) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            email: Some(email.to_string()),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for shopper and admin actions.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added to cart", Some(&[("product_id", "3")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use simea_core::ProductId;

    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("Product 9".to_string());
        assert_eq!(err.to_string(), "Not found: Product 9");

        let err = AppError::BadRequest("cart is empty".to_string());
        assert_eq!(err.to_string(), "Bad request: cart is empty");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(AppError::Catalog(CatalogError::NotFound(ProductId::Seed(9)))),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Catalog(CatalogError::Network("down".to_string()))),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            get_status(AppError::Auth(AuthError::InvalidCredentials)),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::BadRequest("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_internal_details_are_hidden() {
        let err = AppError::Catalog(CatalogError::Decode("column stock is -3".to_string()));
        assert_eq!(err.client_message(), "Internal server error");
    }
}
