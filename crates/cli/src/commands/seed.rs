//! Seed the products table with the built-in catalog.
//!
//! The storefront already shows the built-in catalog while the table is
//! empty; seeding turns those products into editable, stock-tracked rows.

use simea_core::catalog::{CatalogStore, seed_catalog};
use simea_storefront::db::PgCatalogStore;
use tracing::{info, warn};

use super::connect;

/// Insert the built-in catalog.
///
/// # Arguments
///
/// * `force` - Insert even when the table already holds products
///
/// # Errors
///
/// Returns an error if the database is unreachable or an insert fails.
pub async fn catalog(force: bool) -> Result<(), Box<dyn std::error::Error>> {
    let pool = connect().await?;
    let store = PgCatalogStore::new(pool);

    let existing = store.fetch_all().await?;
    if !existing.is_empty() && !force {
        warn!(
            products = existing.len(),
            "Products table is not empty, skipping (use --force to insert anyway)"
        );
        return Ok(());
    }

    let seed = seed_catalog();
    let total = seed.len();
    for product in seed {
        let created = store.create(product.to_fields()).await?;
        info!(seed_id = %product.id, product_id = %created.id, name = %created.name, "Seeded product");
    }

    info!(count = total, "Catalog seeded");
    Ok(())
}
