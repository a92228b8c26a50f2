//! Quantity-tiered price resolution.
//!
//! Every product carries a [`PriceSchedule`] with three tiers. The tier that
//! applies depends only on how many units of a cart line are being bought:
//!
//! | Quantity | Tier        |
//! |----------|-------------|
//! | 1–5      | `unit`      |
//! | 6–11     | `wholesale` |
//! | 12+      | `bulk`      |
//!
//! [`resolve_unit_price`] and [`tier_label`] both go through
//! [`PriceTier::for_quantity`], so the price and the badge shown next to it
//! always agree.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::types::PriceSchedule;

/// Smallest quantity billed at the wholesale price.
pub const WHOLESALE_MIN_QUANTITY: u32 = 6;

/// Smallest quantity billed at the bulk price.
pub const BULK_MIN_QUANTITY: u32 = 12;

/// The pricing tier a quantity falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceTier {
    Unit,
    Wholesale,
    Bulk,
}

impl PriceTier {
    /// Tier for a line quantity. Quantities below 1 fall into [`PriceTier::Unit`].
    #[must_use]
    pub const fn for_quantity(quantity: u32) -> Self {
        if quantity >= BULK_MIN_QUANTITY {
            Self::Bulk
        } else if quantity >= WHOLESALE_MIN_QUANTITY {
            Self::Wholesale
        } else {
            Self::Unit
        }
    }

    /// The schedule's price for this tier.
    #[must_use]
    pub const fn price_in(self, schedule: &PriceSchedule) -> Decimal {
        match self {
            Self::Unit => schedule.unit,
            Self::Wholesale => schedule.wholesale,
            Self::Bulk => schedule.bulk,
        }
    }

    /// Display label used for badging.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Unit => "unit price",
            Self::Wholesale => "wholesale price",
            Self::Bulk => "bulk price",
        }
    }
}

/// Unit price charged for `quantity` units under `schedule`.
#[must_use]
pub const fn resolve_unit_price(schedule: &PriceSchedule, quantity: u32) -> Decimal {
    PriceTier::for_quantity(quantity).price_in(schedule)
}

/// Badge label for `quantity` units.
#[must_use]
pub const fn tier_label(quantity: u32) -> &'static str {
    PriceTier::for_quantity(quantity).label()
}
