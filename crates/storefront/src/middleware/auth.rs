//! Admin authentication extractors.
//!
//! The admin panel is a JSON API, so an anonymous request to a protected
//! handler is answered with `401` rather than a redirect.

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use serde_json::json;
use tower_sessions::Session;

use crate::models::{CurrentAdmin, session::keys};

/// Extractor that requires a logged-in admin.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAdmin(admin): RequireAdmin,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", admin.email)
/// }
/// ```
pub struct RequireAdmin(pub CurrentAdmin);

/// Error returned when a handler requires an admin and nobody is logged in.
#[derive(Debug)]
pub enum AuthRejection {
    /// No admin in the session.
    Unauthorized,
    /// The session layer is missing from the router.
    SessionUnavailable,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "Admin login required" })),
            )
                .into_response(),
            Self::SessionUnavailable => {
                tracing::error!("Session layer missing for admin route");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(AuthRejection::SessionUnavailable)?;

        let admin: CurrentAdmin = session
            .get(keys::CURRENT_ADMIN)
            .await
            .ok()
            .flatten()
            .ok_or(AuthRejection::Unauthorized)?;

        Ok(Self(admin))
    }
}

/// Extractor that optionally gets the logged-in admin.
pub struct OptionalAdmin(pub Option<CurrentAdmin>);

impl<S> FromRequestParts<S> for OptionalAdmin
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let admin = match parts.extensions.get::<Session>() {
            Some(session) => session
                .get::<CurrentAdmin>(keys::CURRENT_ADMIN)
                .await
                .ok()
                .flatten(),
            None => None,
        };

        Ok(Self(admin))
    }
}

/// Store the logged-in admin in the session.
///
/// The session id is cycled first so a pre-login id cannot be reused.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_admin(
    session: &Session,
    admin: &CurrentAdmin,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(keys::CURRENT_ADMIN, admin).await
}

/// Clear the logged-in admin from the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_admin(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<CurrentAdmin>(keys::CURRENT_ADMIN)
        .await?;
    Ok(())
}
