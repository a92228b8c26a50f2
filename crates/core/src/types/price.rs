//! Prices in Argentine pesos and the per-product tiered price schedule.

use std::fmt;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Non-breaking space used by the es-AR currency format between the symbol
/// and the amount.
const NBSP: char = '\u{a0}';

/// An amount in ARS.
///
/// `Display` renders the es-AR currency format with zero decimal digits and
/// `.` as the thousands separator, e.g. `$ 17.600` (with a non-breaking space).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Get the underlying amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rounded = self
            .0
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
        let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
            "-"
        } else {
            ""
        };
        let digits = rounded.abs().trunc().normalize().to_string();
        write!(f, "{sign}${NBSP}{}", group_thousands(&digits))
    }
}

/// Insert `.` between every group of three digits, counting from the right.
fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out
}

/// Quantity-tiered prices for one product.
///
/// `unit` applies to 1–5 units, `wholesale` to 6–11 and `bulk` to 12 or more.
/// The tiers are not required to be monotonic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PriceSchedule {
    pub unit: Decimal,
    pub wholesale: Decimal,
    pub bulk: Decimal,
}

impl PriceSchedule {
    #[must_use]
    pub const fn new(unit: Decimal, wholesale: Decimal, bulk: Decimal) -> Self {
        Self {
            unit,
            wholesale,
            bulk,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ars(n: i64) -> String {
        Price::new(Decimal::from(n)).to_string()
    }

    #[test]
    fn test_display_groups_thousands() {
        assert_eq!(ars(0), "$\u{a0}0");
        assert_eq!(ars(800), "$\u{a0}800");
        assert_eq!(ars(2500), "$\u{a0}2.500");
        assert_eq!(ars(17_600), "$\u{a0}17.600");
        assert_eq!(ars(1_234_567), "$\u{a0}1.234.567");
    }

    #[test]
    fn test_display_rounds_to_whole_pesos() {
        assert_eq!(Price::new(Decimal::new(249_950, 2)).to_string(), "$\u{a0}2.500");
        assert_eq!(Price::new(Decimal::new(249_949, 2)).to_string(), "$\u{a0}2.499");
        assert_eq!(Price::new(Decimal::new(250_000, 2)).to_string(), "$\u{a0}2.500");
    }

    #[test]
    fn test_display_negative() {
        assert_eq!(ars(-1500), "-$\u{a0}1.500");
        assert_eq!(Price::new(Decimal::new(-4, 1)).to_string(), "$\u{a0}0");
    }
}
