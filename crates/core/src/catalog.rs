//! Catalog store interface and the built-in seed catalog.

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::types::{PriceSchedule, Product, ProductFields, ProductId};

/// Stock assigned to stored products that predate stock tracking.
pub const LEGACY_DEFAULT_STOCK: u32 = 50;

/// Errors from the catalog store.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// No product with this id exists in the store.
    #[error("product not found: {0}")]
    NotFound(ProductId),

    /// The store could not be reached or rejected the call.
    #[error("catalog store error: {0}")]
    Network(String),

    /// A stored record could not be interpreted.
    #[error("corrupt catalog record: {0}")]
    Decode(String),
}

/// Remote product CRUD plus stock decrement.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// All products, newest first.
    async fn fetch_all(&self) -> Result<Vec<Product>, CatalogError>;

    /// Persist a new product. The store assigns its id and timestamps.
    async fn create(&self, fields: ProductFields) -> Result<Product, CatalogError>;

    /// Replace a stored product's fields.
    async fn update(&self, id: ProductId, fields: ProductFields) -> Result<(), CatalogError>;

    async fn delete(&self, id: ProductId) -> Result<(), CatalogError>;

    /// Subtract `quantity` from the product's stock, flooring at zero.
    ///
    /// Returns the new stock value.
    async fn decrement_stock(&self, id: ProductId, quantity: u32) -> Result<u32, CatalogError>;
}

/// Something that can re-read the displayed catalog after checkout.
#[async_trait]
pub trait CatalogRefresh: Send + Sync {
    async fn refresh(&self);
}

// =============================================================================
// Seed catalog
// =============================================================================

struct SeedProduct {
    id: u32,
    name: &'static str,
    description: &'static str,
    image: &'static str,
    category: &'static str,
    colors: &'static [&'static str],
    pricing: [i64; 3],
}

const SEED_SIZES: &[&str] = &["S", "M", "L", "XL"];

const SEED_PRODUCTS: &[SeedProduct] = &[
    SeedProduct {
        id: 1,
        name: "Conjunto de Encaje Clásico",
        description: "Conjunto elegante de sostén y bombacha de encaje",
        image: "https://images.unsplash.com/photo-1583419574699-70a8f5c61f66?w=500&h=500&fit=crop",
        category: "conjuntos",
        colors: &["Negro", "Blanco", "Rojo"],
        pricing: [2500, 2200, 2000],
    },
    SeedProduct {
        id: 2,
        name: "Corpiño Push-Up",
        description: "Corpiño con realce y copas preformadas",
        image: "https://images.unsplash.com/photo-1606412366651-5b5f5e44bb76?w=500&h=500&fit=crop",
        category: "corpiños",
        colors: &["Negro", "Nude", "Blanco"],
        pricing: [1800, 1600, 1400],
    },
    SeedProduct {
        id: 3,
        name: "Bombacha Colaless",
        description: "Bombacha colaless de microfibra",
        image: "https://images.unsplash.com/photo-1596993100471-7c5d32c6c6e0?w=500&h=500&fit=crop",
        category: "bombachas",
        colors: &["Negro", "Blanco", "Rosa", "Celeste"],
        pricing: [800, 700, 600],
    },
    SeedProduct {
        id: 4,
        name: "Conjunto Deportivo",
        description: "Top y calza deportiva para máxima comodidad",
        image: "https://images.unsplash.com/photo-1579364046732-c21c2f36f3aa?w=500&h=500&fit=crop",
        category: "deportivo",
        colors: &["Negro", "Gris", "Azul marino"],
        pricing: [3500, 3200, 3000],
    },
    SeedProduct {
        id: 5,
        name: "Pijama de Seda",
        description: "Conjunto de pijama elegante de satén",
        image: "https://images.unsplash.com/photo-1564584217132-2271feaeb3c5?w=500&h=500&fit=crop",
        category: "pijamas",
        colors: &["Negro", "Champagne", "Bordo"],
        pricing: [4500, 4200, 4000],
    },
    SeedProduct {
        id: 6,
        name: "Body de Encaje",
        description: "Body completo de encaje con detalles elegantes",
        image: "https://images.unsplash.com/photo-1590736969955-71cc94901144?w=500&h=500&fit=crop",
        category: "bodys",
        colors: &["Negro", "Blanco"],
        pricing: [3200, 3000, 2800],
    },
    SeedProduct {
        id: 7,
        name: "Pack de 3 Bombachas",
        description: "Pack de 3 bombachas de algodón",
        image: "https://images.unsplash.com/photo-1594633313593-bab3825d0caf?w=500&h=500&fit=crop",
        category: "bombachas",
        colors: &["Variado"],
        pricing: [1500, 1300, 1100],
    },
    SeedProduct {
        id: 8,
        name: "Conjunto Brasilero",
        description: "Conjunto estilo brasilero con diseño moderno",
        image: "https://images.unsplash.com/photo-1583419574699-70a8f5c61f66?w=500&h=500&fit=crop",
        category: "conjuntos",
        colors: &["Animal print", "Negro", "Rojo"],
        pricing: [2800, 2500, 2300],
    },
];

fn owned(labels: &[&str]) -> Vec<String> {
    labels.iter().map(|&s| s.to_owned()).collect()
}

/// The built-in catalog shown when the store is empty or unreachable.
///
/// Seed products are local-only: their ids are [`ProductId::Seed`].
#[must_use]
pub fn seed_catalog() -> Vec<Product> {
    SEED_PRODUCTS
        .iter()
        .map(|seed| {
            let [unit, wholesale, bulk] = seed.pricing;
            Product::from_fields(
                ProductId::Seed(seed.id),
                ProductFields {
                    name: seed.name.to_owned(),
                    description: seed.description.to_owned(),
                    image: seed.image.to_owned(),
                    category: seed.category.to_owned(),
                    sizes: owned(SEED_SIZES),
                    colors: owned(seed.colors),
                    stock: LEGACY_DEFAULT_STOCK,
                    pricing: PriceSchedule::new(
                        Decimal::from(unit),
                        Decimal::from(wholesale),
                        Decimal::from(bulk),
                    ),
                },
            )
        })
        .collect()
}
