//! Catalog route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use simea_core::{ALL_CATEGORY, CATEGORIES, Category, Price, Product, ProductId};

use crate::error::{AppError, Result};
use crate::state::AppState;

/// A product with its shopper-facing display strings.
#[derive(Debug, Serialize)]
pub struct ProductView {
    #[serde(flatten)]
    pub product: Product,
    pub availability: String,
    pub can_purchase: bool,
    pub unit_price_display: String,
    pub wholesale_price_display: String,
    pub bulk_price_display: String,
}

impl From<Product> for ProductView {
    fn from(product: Product) -> Self {
        let availability = product.availability();
        Self {
            availability: availability.label(),
            can_purchase: availability.can_purchase(),
            unit_price_display: Price::from(product.pricing.unit).to_string(),
            wholesale_price_display: Price::from(product.pricing.wholesale).to_string(),
            bulk_price_display: Price::from(product.pricing.bulk).to_string(),
            product,
        }
    }
}

/// Query parameters for the product listing.
#[derive(Debug, Deserialize)]
pub struct ProductsQuery {
    pub category: Option<String>,
}

/// Parse a product id from a path segment.
pub(crate) fn parse_product_id(raw: &str) -> Result<ProductId> {
    raw.parse()
        .map_err(|_| AppError::BadRequest(format!("invalid product id: {raw}")))
}

/// The fixed category list.
pub async fn categories() -> Json<&'static [Category]> {
    Json(CATEGORIES)
}

/// Products in a category (all products when none is given).
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ProductsQuery>,
) -> Json<Vec<ProductView>> {
    let category = query.category.as_deref().unwrap_or(ALL_CATEGORY);
    let products = state.catalog().by_category(category).await;
    Json(products.into_iter().map(ProductView::from).collect())
}

/// A single product.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<ProductView>> {
    let id = parse_product_id(&id)?;
    let product = state
        .catalog()
        .product(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Product {id}")))?;
    Ok(Json(product.into()))
}
