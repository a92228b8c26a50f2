//! Checkout route handlers.
//!
//! Checkout deducts stock for every cart line, hands the order off to the
//! store's WhatsApp and empties the cart. A stock failure does not stop the
//! order: the receipt comes back degraded.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use simea_core::PaymentMethod;
use simea_core::checkout::{CheckoutReceipt, CheckoutSequencer};

use crate::error::{AppError, Result, add_breadcrumb};
use crate::services::{WhatsAppHandoff, session_cart};
use crate::state::AppState;

/// Checkout request. Without a payment method the first enabled one is used.
#[derive(Debug, Default, Deserialize)]
pub struct CheckoutRequest {
    pub payment_method: Option<String>,
}

/// Checkout response.
#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    /// Confirmation shown to the shopper.
    pub notice: &'static str,
    #[serde(flatten)]
    pub receipt: CheckoutReceipt,
}

/// Payment methods offered at checkout.
#[instrument(skip(state))]
pub async fn payment_methods(State(state): State<AppState>) -> Json<Vec<PaymentMethod>> {
    let settings = state.settings().get().await;
    Json(settings.enabled_payment_methods().cloned().collect())
}

/// Run a checkout for the session's cart.
#[instrument(skip(state, session))]
pub async fn checkout(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<CheckoutRequest>,
) -> Result<Json<CheckoutResponse>> {
    let settings = state.settings().get().await;
    let payment_method = settings
        .select_payment_method(request.payment_method.as_deref())
        .ok_or_else(|| AppError::BadRequest("Payment method not available".to_string()))?;

    let mut cart = session_cart(session).await;
    if cart.cart().is_empty() {
        return Err(AppError::BadRequest("Cart is empty".to_string()));
    }

    let handoff = WhatsAppHandoff::new(&settings.whatsapp_number);
    let sequencer = CheckoutSequencer::new(state.catalog().store(), &handoff, state.catalog());
    let receipt = sequencer
        .checkout(&mut cart, payment_method, &settings.store_name)
        .await;

    add_breadcrumb(
        "checkout",
        "Order handed off",
        Some(&[("payment_method", payment_method.id.as_str())]),
    );

    Ok(Json(CheckoutResponse {
        notice: receipt.outcome.notice(),
        receipt,
    }))
}
