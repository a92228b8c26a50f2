//! Checkout: stock deduction followed by the order hand-off.
//!
//! A checkout walks through
//!
//! ```text
//! Idle -> Deducting -> Notifying ---------> Completed
//!              \                           /
//!               `-> NotifyingDegraded ----'
//! ```
//!
//! Stock is decremented one line at a time, in cart order, each call awaited
//! before the next. The first failure stops further decrements and switches
//! to the degraded branch. Decrements already applied stay applied.
//!
//! Both branches build the same order message, hand it off, clear and close
//! the cart and refresh the catalog. A stock failure is reported through
//! tracing and the [`CheckoutOutcome`], never to the shopper as an error.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, error, info, instrument};

use crate::cart::{CartLine, CartLineId, CartStorage, PersistentCart};
use crate::catalog::{CatalogRefresh, CatalogStore};
use crate::order::OrderSummary;
use crate::types::{PaymentMethod, ProductId};

/// Shown to the shopper when every decrement succeeded.
pub const COMPLETED_NOTICE: &str =
    "✅ Gracias por tu compra, no dejes de hacer las consultas necesarias";

/// Shown to the shopper when stock bookkeeping failed.
pub const DEGRADED_NOTICE: &str = "Gracias por tu compra, pronto nos pondremos en contacto";

/// Delivers an encoded order message to the store.
#[async_trait]
pub trait OrderHandoff: Send + Sync {
    /// Hand off the percent-encoded order text.
    ///
    /// Returns the link the shopper should open.
    async fn hand_off(&self, encoded_message: &str) -> String;
}

/// States of a single checkout attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutState {
    Idle,
    Deducting,
    Notifying,
    NotifyingDegraded,
    Completed,
}

/// The decrement that stopped stock deduction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StockDeductionFailure {
    pub line_id: CartLineId,
    pub product_id: ProductId,
    pub error: String,
}

/// How a checkout finished. Both variants mean the order was handed off.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CheckoutOutcome {
    Completed,
    CompletedDegraded { failure: StockDeductionFailure },
}

impl CheckoutOutcome {
    #[must_use]
    pub const fn is_degraded(&self) -> bool {
        matches!(self, Self::CompletedDegraded { .. })
    }

    /// Confirmation text for the shopper.
    #[must_use]
    pub const fn notice(&self) -> &'static str {
        match self {
            Self::Completed => COMPLETED_NOTICE,
            Self::CompletedDegraded { .. } => DEGRADED_NOTICE,
        }
    }
}

/// A stock decrement that went through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StockUpdate {
    pub product_id: ProductId,
    pub remaining: u32,
}

/// Everything a finished checkout produced.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutReceipt {
    pub outcome: CheckoutOutcome,
    /// Link returned by the hand-off.
    pub handoff_link: String,
    /// Plain order text (before encoding).
    pub message: String,
    pub total: Decimal,
    pub stock_updates: Vec<StockUpdate>,
    /// States visited, in order, from `Idle` to `Completed`.
    pub transitions: Vec<CheckoutState>,
}

/// Runs checkouts against a catalog store and an order hand-off.
pub struct CheckoutSequencer<'a> {
    catalog: &'a dyn CatalogStore,
    handoff: &'a dyn OrderHandoff,
    refresh: &'a dyn CatalogRefresh,
}

impl<'a> CheckoutSequencer<'a> {
    #[must_use]
    pub const fn new(
        catalog: &'a dyn CatalogStore,
        handoff: &'a dyn OrderHandoff,
        refresh: &'a dyn CatalogRefresh,
    ) -> Self {
        Self {
            catalog,
            handoff,
            refresh,
        }
    }

    /// Check out the cart with the given payment method.
    ///
    /// Always reaches [`CheckoutState::Completed`]: stock failures degrade the
    /// outcome, and cart persistence failures are logged.
    #[instrument(skip_all, fields(lines = cart.cart().lines().len(), payment_method = %payment_method.id))]
    pub async fn checkout<S: CartStorage>(
        &self,
        cart: &mut PersistentCart<S>,
        payment_method: &PaymentMethod,
        store_name: &str,
    ) -> CheckoutReceipt {
        let mut transitions = vec![CheckoutState::Idle, CheckoutState::Deducting];
        let lines = cart.cart().lines().to_vec();

        let (stock_updates, failure) = self.deduct_stock(&lines).await;
        let outcome = match failure {
            None => {
                transitions.push(CheckoutState::Notifying);
                CheckoutOutcome::Completed
            }
            Some(failure) => {
                transitions.push(CheckoutState::NotifyingDegraded);
                CheckoutOutcome::CompletedDegraded { failure }
            }
        };

        let summary = OrderSummary::new(store_name, &lines, payment_method);
        let message = summary.message();
        let handoff_link = self.handoff.hand_off(&summary.encoded_message()).await;

        if let Err(e) = cart.clear().await {
            error!(error = %e, "Failed to persist cleared cart after checkout");
        }
        if let Err(e) = cart.set_open(false).await {
            error!(error = %e, "Failed to persist closed cart after checkout");
        }
        self.refresh.refresh().await;

        transitions.push(CheckoutState::Completed);
        info!(
            degraded = outcome.is_degraded(),
            deducted = stock_updates.len(),
            "Checkout completed"
        );

        CheckoutReceipt {
            outcome,
            handoff_link,
            message,
            total: summary.total(),
            stock_updates,
            transitions,
        }
    }

    /// Decrement stock line by line, stopping at the first failure.
    async fn deduct_stock(
        &self,
        lines: &[CartLine],
    ) -> (Vec<StockUpdate>, Option<StockDeductionFailure>) {
        let mut updates = Vec::with_capacity(lines.len());

        for line in lines {
            let product_id = line.product.id;
            match self.catalog.decrement_stock(product_id, line.quantity).await {
                Ok(remaining) => {
                    debug!(%product_id, quantity = line.quantity, remaining, "Stock decremented");
                    updates.push(StockUpdate {
                        product_id,
                        remaining,
                    });
                }
                Err(e) => {
                    error!(
                        %product_id,
                        line_id = %line.id,
                        error = %e,
                        "Stock decrement failed, handing off order without stock update"
                    );
                    return (
                        updates,
                        Some(StockDeductionFailure {
                            line_id: line.id.clone(),
                            product_id,
                            error: e.to_string(),
                        }),
                    );
                }
            }
        }

        (updates, None)
    }
}
