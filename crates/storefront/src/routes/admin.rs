//! Admin route handlers.
//!
//! Product and settings management for the store owner. Everything except
//! login requires an admin session.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use simea_core::{Product, ProductDraft, StoreSettings, StoreSettingsInput};

use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{OptionalAdmin, RequireAdmin, clear_current_admin, set_current_admin};
use crate::routes::catalog::parse_product_id;
use crate::services::auth::AuthService;
use crate::state::AppState;

// =============================================================================
// Session
// =============================================================================

/// Admin login request. `login` may omit the `@simea.com` domain.
#[derive(Deserialize)]
pub struct LoginRequest {
    pub login: String,
    pub password: String,
}

/// Admin session status.
#[derive(Debug, Serialize)]
pub struct SessionStatus {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Log the admin in.
#[instrument(skip(state, session, request))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<LoginRequest>,
) -> Result<Json<SessionStatus>> {
    let admin = AuthService::new(&state.config().admin).login(&request.login, &request.password)?;

    set_current_admin(&session, &admin).await?;
    set_sentry_user(&admin.email);
    tracing::info!(email = %admin.email, "Admin logged in");

    Ok(Json(SessionStatus {
        authenticated: true,
        email: Some(admin.email),
    }))
}

/// Log the admin out.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<StatusCode> {
    clear_current_admin(&session).await?;
    clear_sentry_user();
    Ok(StatusCode::NO_CONTENT)
}

/// Whether an admin is logged in.
pub async fn session_status(OptionalAdmin(admin): OptionalAdmin) -> Json<SessionStatus> {
    Json(SessionStatus {
        authenticated: admin.is_some(),
        email: admin.map(|a| a.email),
    })
}

// =============================================================================
// Products
// =============================================================================

/// Manual stock adjustment for sales made outside the storefront.
#[derive(Debug, Deserialize)]
pub struct StockAdjustment {
    pub sold: u32,
}

/// Result of a manual stock adjustment.
#[derive(Debug, Serialize)]
pub struct StockAdjusted {
    pub product: Product,
    pub remaining: u32,
}

/// All displayed products, including seed products.
#[instrument(skip_all)]
pub async fn list_products(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> Json<Vec<Product>> {
    Json(state.catalog().products().await.as_ref().clone())
}

/// Create a product. The draft is coerced, never rejected.
#[instrument(skip_all, fields(admin = %admin.email))]
pub async fn create_product(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(draft): Json<ProductDraft>,
) -> Result<(StatusCode, Json<Product>)> {
    let product = state.catalog().create(&draft).await?;
    tracing::info!(product_id = %product.id, "Product created");
    Ok((StatusCode::CREATED, Json(product)))
}

/// Replace a product's fields.
#[instrument(skip_all, fields(admin = %admin.email, product_id = %id))]
pub async fn update_product(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(draft): Json<ProductDraft>,
) -> Result<Json<Product>> {
    let id = parse_product_id(&id)?;
    let product = state.catalog().update(id, &draft).await?;
    tracing::info!(product_id = %product.id, "Product updated");
    Ok(Json(product))
}

/// Delete a product.
#[instrument(skip_all, fields(admin = %admin.email, product_id = %id))]
pub async fn delete_product(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let id = parse_product_id(&id)?;
    state.catalog().delete(id).await?;
    tracing::info!(product_id = %id, "Product deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Record units sold outside the storefront.
#[instrument(skip_all, fields(admin = %admin.email, product_id = %id))]
pub async fn adjust_stock(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(adjustment): Json<StockAdjustment>,
) -> Result<Json<StockAdjusted>> {
    if adjustment.sold == 0 {
        return Err(AppError::BadRequest("sold must be at least 1".to_string()));
    }

    let id = parse_product_id(&id)?;
    let remaining = state
        .catalog()
        .store()
        .decrement_stock(id, adjustment.sold)
        .await?;
    let products = state.catalog().reload().await;
    let product = products
        .iter()
        .find(|p| p.id == id)
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("Product {id}")))?;

    tracing::info!(product_id = %id, sold = adjustment.sold, remaining, "Stock adjusted");
    Ok(Json(StockAdjusted { product, remaining }))
}

// =============================================================================
// Settings
// =============================================================================

/// Current store settings.
pub async fn get_settings(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> Json<StoreSettings> {
    Json(state.settings().get().await)
}

/// Replace the store settings.
#[instrument(skip_all, fields(admin = %admin.email))]
pub async fn update_settings(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<StoreSettingsInput>,
) -> Result<Json<StoreSettings>> {
    if input.store_name.trim().is_empty() {
        return Err(AppError::BadRequest("store_name is required".to_string()));
    }
    if !input.whatsapp_number.chars().any(|c| c.is_ascii_digit()) {
        return Err(AppError::BadRequest(
            "whatsapp_number must contain digits".to_string(),
        ));
    }

    let settings = state.settings().update(input).await?;
    Ok(Json(settings))
}
