//! Cart route handlers.
//!
//! The cart lives in the shopper's session. Every mutation answers with the
//! full cart view so clients never recompute prices.

use axum::{Json, extract::State};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use simea_core::cart::{Cart, CartLine, CartLineId, line_subtotal};
use simea_core::{Price, ProductId};

use crate::error::{AppError, Result, add_breadcrumb};
use crate::routes::catalog::parse_product_id;
use crate::services::session_cart;
use crate::state::AppState;

// =============================================================================
// Views
// =============================================================================

/// One cart line with resolved pricing.
#[derive(Debug, Serialize)]
pub struct CartLineView {
    pub id: CartLineId,
    pub product_id: ProductId,
    pub name: String,
    pub image: String,
    pub size: String,
    pub color: String,
    pub quantity: u32,
    pub tier: &'static str,
    pub unit_price: Decimal,
    pub unit_price_display: String,
    pub subtotal: Decimal,
    pub subtotal_display: String,
}

impl From<&CartLine> for CartLineView {
    fn from(line: &CartLine) -> Self {
        let unit_price = line.unit_price();
        let subtotal = line_subtotal(line);
        Self {
            id: line.id.clone(),
            product_id: line.product.id,
            name: line.product.name.clone(),
            image: line.product.image.clone(),
            size: line.size.clone(),
            color: line.color.clone(),
            quantity: line.quantity,
            tier: line.tier().label(),
            unit_price,
            unit_price_display: Price::from(unit_price).to_string(),
            subtotal,
            subtotal_display: Price::from(subtotal).to_string(),
        }
    }
}

/// The whole cart.
#[derive(Debug, Serialize)]
pub struct CartView {
    pub lines: Vec<CartLineView>,
    pub item_count: u64,
    pub total: Decimal,
    pub total_display: String,
    pub is_open: bool,
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        let total = cart.total();
        Self {
            lines: cart.lines().iter().map(CartLineView::from).collect(),
            item_count: cart.total_item_count(),
            total,
            total_display: Price::from(total).to_string(),
            is_open: cart.is_open(),
        }
    }
}

/// Cart badge count.
#[derive(Debug, Serialize)]
pub struct CartCount {
    pub count: u64,
}

// =============================================================================
// Request Bodies
// =============================================================================

/// Add to cart request. Size and color default to the product's first option.
#[derive(Debug, Deserialize)]
pub struct AddToCartRequest {
    pub product_id: String,
    pub size: Option<String>,
    pub color: Option<String>,
    pub quantity: Option<u32>,
}

/// Update quantity request.
#[derive(Debug, Deserialize)]
pub struct UpdateCartRequest {
    pub line_id: String,
    pub quantity: i64,
}

/// Remove line request.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartRequest {
    pub line_id: String,
}

/// Open or close the cart panel.
#[derive(Debug, Deserialize)]
pub struct SetOpenRequest {
    pub open: bool,
}

/// Resolve a requested option against the product's list.
fn pick_option(options: &[String], requested: Option<String>, what: &str) -> Result<String> {
    match requested {
        Some(value) if options.is_empty() || options.contains(&value) => Ok(value),
        Some(value) => Err(AppError::BadRequest(format!("{what} not offered: {value}"))),
        None => Ok(options.first().cloned().unwrap_or_default()),
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Show the cart.
#[instrument(skip(session))]
pub async fn show(session: Session) -> Json<CartView> {
    let cart = session_cart(session).await;
    Json(CartView::from(cart.cart()))
}

/// Cart item count for the badge.
#[instrument(skip(session))]
pub async fn count(session: Session) -> Json<CartCount> {
    let cart = session_cart(session).await;
    Json(CartCount {
        count: cart.cart().total_item_count(),
    })
}

/// Add a product configuration to the cart.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<AddToCartRequest>,
) -> Result<Json<CartView>> {
    let product_id = parse_product_id(&request.product_id)?;
    let product = state
        .catalog()
        .product(product_id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Product {product_id}")))?;

    if !product.availability().can_purchase() {
        return Err(AppError::BadRequest(format!("{} is out of stock", product.name)));
    }

    let size = pick_option(&product.sizes, request.size, "size")?;
    let color = pick_option(&product.colors, request.color, "color")?;

    let mut cart = session_cart(session).await;
    let line_id = cart
        .add_line(&product, &size, &color, request.quantity.unwrap_or(1))
        .await?;

    add_breadcrumb("cart", "Added to cart", Some(&[("line_id", line_id.as_str())]));
    Ok(Json(CartView::from(cart.cart())))
}

/// Replace a line's quantity. Quantities below 1 leave the cart unchanged.
#[instrument(skip(session))]
pub async fn update(session: Session, Json(request): Json<UpdateCartRequest>) -> Result<Json<CartView>> {
    let mut cart = session_cart(session).await;
    cart.update_quantity(&CartLineId::from(request.line_id), request.quantity)
        .await?;
    Ok(Json(CartView::from(cart.cart())))
}

/// Remove a line.
#[instrument(skip(session))]
pub async fn remove(
    session: Session,
    Json(request): Json<RemoveFromCartRequest>,
) -> Result<Json<CartView>> {
    let mut cart = session_cart(session).await;
    cart.remove_line(&CartLineId::from(request.line_id)).await?;
    Ok(Json(CartView::from(cart.cart())))
}

/// Empty the cart.
#[instrument(skip(session))]
pub async fn clear(session: Session) -> Result<Json<CartView>> {
    let mut cart = session_cart(session).await;
    cart.clear().await?;
    Ok(Json(CartView::from(cart.cart())))
}

/// Open or close the cart panel.
#[instrument(skip(session))]
pub async fn set_open(session: Session, Json(request): Json<SetOpenRequest>) -> Result<Json<CartView>> {
    let mut cart = session_cart(session).await;
    cart.set_open(request.open).await?;
    Ok(Json(CartView::from(cart.cart())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pick_option_defaults_to_first() {
        let sizes = vec!["S".to_string(), "M".to_string()];
        assert_eq!(pick_option(&sizes, None, "size").ok(), Some("S".to_string()));
        assert_eq!(
            pick_option(&sizes, Some("M".to_string()), "size").ok(),
            Some("M".to_string())
        );
    }

    #[test]
    fn test_pick_option_rejects_unknown() {
        let colors = vec!["Negro".to_string()];
        assert!(matches!(
            pick_option(&colors, Some("Verde".to_string()), "color"),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn test_pick_option_without_options() {
        assert_eq!(pick_option(&[], None, "size").ok(), Some(String::new()));
        assert_eq!(
            pick_option(&[], Some("Único".to_string()), "size").ok(),
            Some("Único".to_string())
        );
    }
}
