//! Products, admin-submitted product drafts and the category list.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::id::ProductId;
use super::price::PriceSchedule;

/// Category assigned when a draft does not name one.
pub const DEFAULT_CATEGORY: &str = "conjuntos";

/// Below this many units a product is shown as running out.
pub const LOW_STOCK_THRESHOLD: u32 = 10;

/// Pseudo-category that matches every product.
pub const ALL_CATEGORY: &str = "todos";

/// A catalog category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Category {
    pub id: &'static str,
    pub name: &'static str,
}

/// The fixed category list, in display order.
pub const CATEGORIES: &[Category] = &[
    Category { id: ALL_CATEGORY, name: "Todos los Productos" },
    Category { id: "conjuntos", name: "Conjuntos" },
    Category { id: "corpiños", name: "Corpiños" },
    Category { id: "bombachas", name: "Bombachas" },
    Category { id: "deportivo", name: "Deportivo" },
    Category { id: "pijamas", name: "Pijamas" },
    Category { id: "bodys", name: "Bodys" },
];

/// A product as shown in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    /// Opaque image reference (usually a URL).
    pub image: String,
    pub category: String,
    pub sizes: Vec<String>,
    pub colors: Vec<String>,
    pub stock: u32,
    pub pricing: PriceSchedule,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Product {
    /// Build a product from sanitized fields and an identity.
    #[must_use]
    pub fn from_fields(id: ProductId, fields: ProductFields) -> Self {
        Self {
            id,
            name: fields.name,
            description: fields.description,
            image: fields.image,
            category: fields.category,
            sizes: fields.sizes,
            colors: fields.colors,
            stock: fields.stock,
            pricing: fields.pricing,
            created_at: None,
            updated_at: None,
        }
    }

    /// The writable attributes of this product.
    #[must_use]
    pub fn to_fields(&self) -> ProductFields {
        ProductFields {
            name: self.name.clone(),
            description: self.description.clone(),
            image: self.image.clone(),
            category: self.category.clone(),
            sizes: self.sizes.clone(),
            colors: self.colors.clone(),
            stock: self.stock,
            pricing: self.pricing,
        }
    }

    /// Whether the product belongs to `category` (`todos` matches everything).
    #[must_use]
    pub fn in_category(&self, category: &str) -> bool {
        category == ALL_CATEGORY || self.category == category
    }

    #[must_use]
    pub const fn availability(&self) -> Availability {
        match self.stock {
            0 => Availability::SoldOut,
            n if n < LOW_STOCK_THRESHOLD => Availability::Low(n),
            n => Availability::InStock(n),
        }
    }

    /// Whether `size` and `color` are among the product's options.
    #[must_use]
    pub fn offers(&self, size: &str, color: &str) -> bool {
        self.sizes.iter().any(|s| s == size) && self.colors.iter().any(|c| c == color)
    }
}

/// Stock level as shown to shoppers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    SoldOut,
    Low(u32),
    InStock(u32),
}

impl Availability {
    #[must_use]
    pub const fn can_purchase(self) -> bool {
        !matches!(self, Self::SoldOut)
    }

    /// Shopper-facing label.
    #[must_use]
    pub fn label(self) -> String {
        match self {
            Self::SoldOut => "Sin stock".to_string(),
            Self::Low(n) => format!("Últimas {n} unidades"),
            Self::InStock(n) => format!("{n} disponibles"),
        }
    }
}

/// Strongly-typed product attributes written to the catalog store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductFields {
    pub name: String,
    pub description: String,
    pub image: String,
    pub category: String,
    pub sizes: Vec<String>,
    pub colors: Vec<String>,
    pub stock: u32,
    pub pricing: PriceSchedule,
}

/// Loosely-typed product input from the admin surface.
///
/// Every field is accepted as arbitrary JSON; [`ProductDraft::sanitize`]
/// coerces it into [`ProductFields`] without ever rejecting the draft.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProductDraft {
    pub name: Value,
    pub description: Value,
    pub image: Value,
    pub category: Value,
    pub sizes: Value,
    pub colors: Value,
    pub stock: Value,
    pub pricing: Value,
}

impl ProductDraft {
    /// Coerce the draft into storable fields.
    ///
    /// - missing text fields become empty (category becomes `conjuntos`)
    /// - sizes/colors that are not arrays become empty
    /// - stock that is not a non-negative number becomes 0
    /// - prices that are not non-negative numbers become 0
    #[must_use]
    pub fn sanitize(&self) -> ProductFields {
        let category = text(&self.category);
        let pricing = PriceSchedule {
            unit: price_field(&self.pricing, "unit"),
            wholesale: price_field(&self.pricing, "wholesale"),
            bulk: price_field(&self.pricing, "bulk"),
        };

        ProductFields {
            name: text(&self.name),
            description: text(&self.description),
            image: text(&self.image),
            category: if category.is_empty() {
                DEFAULT_CATEGORY.to_owned()
            } else {
                category
            },
            sizes: labels(&self.sizes),
            colors: labels(&self.colors),
            stock: stock(&self.stock),
            pricing,
        }
    }
}

fn text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

fn labels(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .map(text)
            .filter(|label| !label.is_empty())
            .collect(),
        _ => Vec::new(),
    }
}

/// Interpret a JSON value as a decimal number.
///
/// Numeric strings are accepted; an empty string counts as zero.
fn numeric(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .map(Decimal::from)
            .or_else(|| n.as_u64().map(Decimal::from))
            .or_else(|| n.as_f64().and_then(|f| Decimal::try_from(f).ok())),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                return Some(Decimal::ZERO);
            }
            s.parse::<Decimal>()
                .ok()
                .or_else(|| Decimal::from_scientific(s).ok())
        }
        Value::Bool(b) => Some(Decimal::from(u8::from(*b))),
        Value::Null => Some(Decimal::ZERO),
        Value::Array(_) | Value::Object(_) => None,
    }
}

fn stock(value: &Value) -> u32 {
    numeric(value)
        .filter(|n| !n.is_sign_negative())
        .map_or(0, |n| n.trunc().to_u32().unwrap_or(u32::MAX))
}

fn price_field(pricing: &Value, key: &str) -> Decimal {
    pricing
        .get(key)
        .and_then(numeric)
        .filter(|n| !n.is_sign_negative())
        .unwrap_or(Decimal::ZERO)
}
