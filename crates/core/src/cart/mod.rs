//! Shopping cart: lines keyed by product, size and color.
//!
//! A [`Cart`] is plain in-memory state. [`PersistentCart`] wraps it and
//! writes the whole line sequence to a [`CartStorage`] backend after every
//! mutation, so a cart survives reloads of the shopper's session.
//!
//! Totals are never stored. [`line_subtotal`] and [`cart_total`] recompute
//! them from the price schedule snapshot carried by each line.

mod storage;

pub use storage::{
    CART_OPEN_STORAGE_KEY, CART_STORAGE_KEY, CartStorage, CartStorageError, PersistentCart,
};

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::pricing::{PriceTier, resolve_unit_price};
use crate::types::{Product, ProductId};

// =============================================================================
// Line identity
// =============================================================================

/// Identity of a cart line: `"{product_id}-{size}-{color}"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CartLineId(String);

impl CartLineId {
    /// Derive the line id for a product configuration.
    #[must_use]
    pub fn derive(product_id: &ProductId, size: &str, color: &str) -> Self {
        Self(format!("{product_id}-{size}-{color}"))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CartLineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for CartLineId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for CartLineId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

// =============================================================================
// Cart line
// =============================================================================

/// One purchasable configuration in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub id: CartLineId,
    /// Snapshot of the product taken when the line was first added.
    pub product: Product,
    pub size: String,
    pub color: String,
    pub quantity: u32,
}

impl CartLine {
    /// Pricing tier for the current quantity.
    #[must_use]
    pub const fn tier(&self) -> PriceTier {
        PriceTier::for_quantity(self.quantity)
    }

    /// Unit price for the current quantity.
    #[must_use]
    pub const fn unit_price(&self) -> Decimal {
        resolve_unit_price(&self.product.pricing, self.quantity)
    }
}

/// `unit price × quantity` for one line.
#[must_use]
pub fn line_subtotal(line: &CartLine) -> Decimal {
    line.unit_price() * Decimal::from(line.quantity)
}

/// Sum of all line subtotals. Zero for an empty cart.
#[must_use]
pub fn cart_total(lines: &[CartLine]) -> Decimal {
    lines.iter().map(line_subtotal).sum()
}

// =============================================================================
// Cart
// =============================================================================

/// Ordered cart lines plus the cart panel's open flag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    lines: Vec<CartLine>,
    is_open: bool,
}

impl Cart {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            lines: Vec::new(),
            is_open: false,
        }
    }

    /// Rebuild a cart from previously persisted lines.
    #[must_use]
    pub const fn from_lines(lines: Vec<CartLine>, is_open: bool) -> Self {
        Self { lines, is_open }
    }

    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.is_open
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    #[must_use]
    pub fn line(&self, id: &CartLineId) -> Option<&CartLine> {
        self.lines.iter().find(|l| &l.id == id)
    }

    /// Add a product configuration, merging into an existing line with the
    /// same id. Opens the cart.
    ///
    /// A quantity of 0 counts as 1. Merging only sums quantities: the
    /// existing line keeps its product snapshot.
    pub fn add_line(
        &mut self,
        product: &Product,
        size: &str,
        color: &str,
        quantity: u32,
    ) -> CartLineId {
        let quantity = quantity.max(1);
        let id = CartLineId::derive(&product.id, size, color);
        self.is_open = true;

        if let Some(line) = self.lines.iter_mut().find(|l| l.id == id) {
            line.quantity = line.quantity.saturating_add(quantity);
        } else {
            self.lines.push(CartLine {
                id: id.clone(),
                product: product.clone(),
                size: size.to_owned(),
                color: color.to_owned(),
                quantity,
            });
        }
        id
    }

    /// Replace a line's quantity. Quantities below 1 are ignored.
    ///
    /// Returns whether a line changed.
    pub fn update_quantity(&mut self, id: &CartLineId, quantity: i64) -> bool {
        if quantity < 1 {
            return false;
        }
        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        match self.lines.iter_mut().find(|l| &l.id == id) {
            Some(line) => {
                line.quantity = quantity;
                true
            }
            None => false,
        }
    }

    /// Remove a line. Removing a missing line is a no-op.
    ///
    /// Returns whether a line was removed.
    pub fn remove_line(&mut self, id: &CartLineId) -> bool {
        let before = self.lines.len();
        self.lines.retain(|l| &l.id != id);
        self.lines.len() < before
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub const fn set_open(&mut self, is_open: bool) {
        self.is_open = is_open;
    }

    /// Sum of all line quantities.
    #[must_use]
    pub fn total_item_count(&self) -> u64 {
        self.lines.iter().map(|l| u64::from(l.quantity)).sum()
    }

    /// Grand total of the cart.
    #[must_use]
    pub fn total(&self) -> Decimal {
        cart_total(&self.lines)
    }
}
