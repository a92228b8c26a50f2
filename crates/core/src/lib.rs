//! Simea Core - pricing, cart and checkout logic.
//!
//! This crate holds the storefront's domain logic and is shared by:
//! - `storefront` - JSON API for shoppers and the admin surface
//! - `cli` - Command-line tools for migrations and seeding
//!
//! # Architecture
//!
//! The core crate contains only types, pure logic and the traits at its
//! seams (catalog store, settings store, cart storage, order hand-off). No
//! database access and no HTTP clients live here; the storefront supplies
//! the implementations.
//!
//! # Modules
//!
//! - [`types`] - Products, prices, payment methods and store settings
//! - [`pricing`] - Quantity-tiered unit price resolution
//! - [`cart`] - Cart lines, merge rules, totals and write-through persistence
//! - [`order`] - Order summary and the WhatsApp order message
//! - [`catalog`] - Catalog store interface and the seed catalog
//! - [`settings`] - Settings store interface
//! - [`checkout`] - The checkout sequencer

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod order;
pub mod pricing;
pub mod settings;
pub mod types;

pub use types::*;
