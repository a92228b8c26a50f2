//! Business logic services for storefront.
//!
//! # Services
//!
//! - `auth` - Admin login against the configured account
//! - `cart` - Shopper carts persisted in the session
//! - `catalog` - Cached catalog with seed fallback
//! - `settings` - Cached store settings
//! - `whatsapp` - Order hand-off through `wa.me` links

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod settings;
pub mod whatsapp;

pub use cart::{SessionCartStorage, session_cart};
pub use catalog::CatalogService;
pub use settings::SettingsService;
pub use whatsapp::WhatsAppHandoff;
