//! `PostgreSQL` implementation of the catalog store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use simea_core::catalog::{CatalogError, CatalogStore, LEGACY_DEFAULT_STOCK};
use simea_core::{PriceSchedule, Product, ProductFields, ProductId};

use super::RepositoryError;

const SELECT_COLUMNS: &str = "id, name, description, image, category, sizes, colors, stock, \
     price_unit, price_wholesale, price_bulk, created_at, updated_at";

/// Row of the `products` table.
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: Uuid,
    name: String,
    description: String,
    image: String,
    category: String,
    sizes: Vec<String>,
    colors: Vec<String>,
    /// `NULL` for products created before stock was tracked.
    stock: Option<i32>,
    price_unit: Decimal,
    price_wholesale: Decimal,
    price_bulk: Decimal,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = RepositoryError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let stock = stock_from_column(row.stock).map_err(|value| {
            RepositoryError::DataCorruption(format!(
                "negative stock {value} for product {}",
                row.id
            ))
        })?;

        Ok(Self {
            id: ProductId::Stored(row.id),
            name: row.name,
            description: row.description,
            image: row.image,
            category: row.category,
            sizes: row.sizes,
            colors: row.colors,
            stock,
            pricing: PriceSchedule::new(row.price_unit, row.price_wholesale, row.price_bulk),
            created_at: Some(row.created_at),
            updated_at: Some(row.updated_at),
        })
    }
}

/// Interpret the nullable stock column. Errors carry the offending value.
fn stock_from_column(stock: Option<i32>) -> Result<u32, i32> {
    stock.map_or(Ok(LEGACY_DEFAULT_STOCK), |value| {
        u32::try_from(value).map_err(|_| value)
    })
}

fn stock_to_column(stock: u32) -> i32 {
    i32::try_from(stock).unwrap_or(i32::MAX)
}

/// Catalog store backed by the `products` table.
#[derive(Debug, Clone)]
pub struct PgCatalogStore {
    pool: PgPool,
}

impl PgCatalogStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn stored_stock(&self, id: Uuid) -> Result<Option<Option<i32>>, RepositoryError> {
        let stock = sqlx::query_scalar::<_, Option<i32>>("SELECT stock FROM products WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(stock)
    }
}

#[async_trait]
impl CatalogStore for PgCatalogStore {
    #[tracing::instrument(skip(self))]
    async fn fetch_all(&self) -> Result<Vec<Product>, CatalogError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM products ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        rows.into_iter()
            .map(|row| Product::try_from(row).map_err(CatalogError::from))
            .collect()
    }

    #[tracing::instrument(skip_all, fields(name = %fields.name))]
    async fn create(&self, fields: ProductFields) -> Result<Product, CatalogError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r"
            INSERT INTO products
                (id, name, description, image, category, sizes, colors, stock,
                 price_unit, price_wholesale, price_bulk)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {SELECT_COLUMNS}
            "
        ))
        .bind(Uuid::new_v4())
        .bind(&fields.name)
        .bind(&fields.description)
        .bind(&fields.image)
        .bind(&fields.category)
        .bind(&fields.sizes)
        .bind(&fields.colors)
        .bind(stock_to_column(fields.stock))
        .bind(fields.pricing.unit)
        .bind(fields.pricing.wholesale)
        .bind(fields.pricing.bulk)
        .fetch_one(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        let product = Product::try_from(row)?;
        tracing::info!(product_id = %product.id, "Product created");
        Ok(product)
    }

    #[tracing::instrument(skip(self, fields))]
    async fn update(&self, id: ProductId, fields: ProductFields) -> Result<(), CatalogError> {
        let uuid = id.as_uuid().ok_or(CatalogError::NotFound(id))?;

        let result = sqlx::query(
            r"
            UPDATE products
            SET name = $2, description = $3, image = $4, category = $5,
                sizes = $6, colors = $7, stock = $8,
                price_unit = $9, price_wholesale = $10, price_bulk = $11,
                updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(uuid)
        .bind(&fields.name)
        .bind(&fields.description)
        .bind(&fields.image)
        .bind(&fields.category)
        .bind(&fields.sizes)
        .bind(&fields.colors)
        .bind(stock_to_column(fields.stock))
        .bind(fields.pricing.unit)
        .bind(fields.pricing.wholesale)
        .bind(fields.pricing.bulk)
        .execute(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        if result.rows_affected() == 0 {
            return Err(CatalogError::NotFound(id));
        }
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn delete(&self, id: ProductId) -> Result<(), CatalogError> {
        // Seed products were never written, so there is nothing to delete.
        let Some(uuid) = id.as_uuid() else {
            return Ok(());
        };

        sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(uuid)
            .execute(&self.pool)
            .await
            .map_err(RepositoryError::from)?;
        Ok(())
    }

    /// Read-then-write decrement without a concurrency guard: two checkouts
    /// racing on the same product can both read the old value.
    #[tracing::instrument(skip(self))]
    async fn decrement_stock(&self, id: ProductId, quantity: u32) -> Result<u32, CatalogError> {
        let uuid = id.as_uuid().ok_or(CatalogError::NotFound(id))?;

        let current = self
            .stored_stock(uuid)
            .await?
            .ok_or(CatalogError::NotFound(id))?;
        let current = stock_from_column(current).map_err(|value| {
            CatalogError::Decode(format!("negative stock {value} for product {uuid}"))
        })?;
        let remaining = current.saturating_sub(quantity);

        sqlx::query("UPDATE products SET stock = $2, updated_at = NOW() WHERE id = $1")
            .bind(uuid)
            .bind(stock_to_column(remaining))
            .execute(&self.pool)
            .await
            .map_err(RepositoryError::from)?;

        tracing::debug!(current, remaining, "Stock updated");
        Ok(remaining)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_stock_uses_legacy_default() {
        assert_eq!(stock_from_column(None), Ok(LEGACY_DEFAULT_STOCK));
        assert_eq!(stock_from_column(Some(3)), Ok(3));
        assert_eq!(stock_from_column(Some(-1)), Err(-1));
    }

    #[test]
    fn test_stock_to_column_saturates() {
        assert_eq!(stock_to_column(12), 12);
        assert_eq!(stock_to_column(u32::MAX), i32::MAX);
    }
}
