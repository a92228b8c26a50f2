//! Domain types for the Simea storefront.

pub mod id;
pub mod price;
pub mod product;
pub mod settings;

pub use id::{ProductId, ProductIdParseError};
pub use price::{Price, PriceSchedule};
pub use product::{
    ALL_CATEGORY, Availability, CATEGORIES, Category, DEFAULT_CATEGORY, LOW_STOCK_THRESHOLD,
    Product, ProductDraft, ProductFields,
};
pub use settings::{CASH_PAYMENT_METHOD_ID, PaymentMethod, StoreSettings, StoreSettingsInput};
