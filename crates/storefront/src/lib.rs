//! Simea storefront library.
//!
//! JSON storefront and admin API for the Simea lingerie shop: catalog with
//! tiered pricing, session carts, WhatsApp checkout and product management.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

pub use routes::app;
pub use state::AppState;
