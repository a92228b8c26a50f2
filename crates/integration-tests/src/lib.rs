//! Integration test support for Simea.
//!
//! In-memory implementations of the storefront's seams (catalog store,
//! settings store, cart storage, order hand-off) and an HTTP client that
//! drives the real router through `tower::ServiceExt::oneshot`.
//!
//! No database is needed: the `PgPool` in [`AppState`] is lazy and only the
//! readiness probe would touch it.
//!
//! # Test Categories
//!
//! - `cart_persistence` - Carts surviving a storage round trip
//! - `checkout_flow` - Stock deduction and WhatsApp hand-off
//! - `catalog_service` - Seed fallback and admin edits
//! - `http_api` - The HTTP surface end to end

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::collections::{HashMap, HashSet};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{Method, Request, StatusCode, header};
use chrono::Utc;
use secrecy::SecretString;
use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use tokio::sync::Mutex;
use tower::ServiceExt;
use tower_sessions::MemoryStore;
use uuid::Uuid;

use simea_core::cart::{CartStorage, CartStorageError};
use simea_core::catalog::{CatalogError, CatalogRefresh, CatalogStore};
use simea_core::checkout::OrderHandoff;
use simea_core::settings::{SettingsError, SettingsStore};
use simea_core::{Product, ProductFields, ProductId, StoreSettings, StoreSettingsInput};
use simea_storefront::config::{AdminConfig, StorefrontConfig};
use simea_storefront::middleware::session_layer;
use simea_storefront::services::auth::hash_password;
use simea_storefront::{AppState, app};

// =============================================================================
// Catalog Store
// =============================================================================

/// Catalog store held in memory, with injectable failures.
#[derive(Default)]
pub struct InMemoryCatalogStore {
    products: Mutex<Vec<Product>>,
    failing_decrements: Mutex<HashSet<ProductId>>,
    decrement_calls: Mutex<Vec<(ProductId, u32)>>,
    unavailable: AtomicBool,
}

impl InMemoryCatalogStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-filled with persisted copies of `products`.
    pub async fn with_products(products: &[Product]) -> Self {
        let store = Self::new();
        for product in products.iter().rev() {
            store.create(product.to_fields()).await.unwrap();
        }
        store
    }

    /// Make every decrement of `id` fail.
    pub async fn fail_decrement(&self, id: ProductId) {
        self.failing_decrements.lock().await.insert(id);
    }

    /// Make every call fail as if the backend were unreachable.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Decrements attempted so far, in order.
    pub async fn decrement_calls(&self) -> Vec<(ProductId, u32)> {
        self.decrement_calls.lock().await.clone()
    }

    /// Current stored products.
    pub async fn snapshot(&self) -> Vec<Product> {
        self.products.lock().await.clone()
    }

    /// Current stock of a stored product.
    pub async fn stock_of(&self, id: ProductId) -> Option<u32> {
        self.products
            .lock()
            .await
            .iter()
            .find(|p| p.id == id)
            .map(|p| p.stock)
    }

    fn check_available(&self) -> Result<(), CatalogError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(CatalogError::Network("store unavailable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl CatalogStore for InMemoryCatalogStore {
    async fn fetch_all(&self) -> Result<Vec<Product>, CatalogError> {
        self.check_available()?;
        Ok(self.products.lock().await.clone())
    }

    async fn create(&self, fields: ProductFields) -> Result<Product, CatalogError> {
        self.check_available()?;
        let now = Utc::now();
        let product = Product {
            created_at: Some(now),
            updated_at: Some(now),
            ..Product::from_fields(ProductId::from(Uuid::new_v4()), fields)
        };
        self.products.lock().await.insert(0, product.clone());
        Ok(product)
    }

    async fn update(&self, id: ProductId, fields: ProductFields) -> Result<(), CatalogError> {
        self.check_available()?;
        let mut products = self.products.lock().await;
        let slot = products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(CatalogError::NotFound(id))?;
        *slot = Product {
            created_at: slot.created_at,
            updated_at: Some(Utc::now()),
            ..Product::from_fields(id, fields)
        };
        Ok(())
    }

    async fn delete(&self, id: ProductId) -> Result<(), CatalogError> {
        self.check_available()?;
        self.products.lock().await.retain(|p| p.id != id);
        Ok(())
    }

    async fn decrement_stock(&self, id: ProductId, quantity: u32) -> Result<u32, CatalogError> {
        self.decrement_calls.lock().await.push((id, quantity));
        self.check_available()?;

        if self.failing_decrements.lock().await.contains(&id) {
            return Err(CatalogError::Network(format!("decrement of {id} rejected")));
        }

        let mut products = self.products.lock().await;
        let product = products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(CatalogError::NotFound(id))?;
        product.stock = product.stock.saturating_sub(quantity);
        Ok(product.stock)
    }
}

// =============================================================================
// Settings Store
// =============================================================================

/// Settings store held in memory.
#[derive(Default)]
pub struct InMemorySettingsStore {
    settings: Mutex<Option<StoreSettings>>,
    unavailable: AtomicBool,
    reads: AtomicUsize,
}

impl InMemorySettingsStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of `get` calls that reached the store.
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SettingsStore for InMemorySettingsStore {
    async fn get(&self) -> Result<StoreSettings, SettingsError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(SettingsError::Network("store unavailable".to_string()));
        }
        let mut settings = self.settings.lock().await;
        Ok(settings
            .get_or_insert_with(|| StoreSettings {
                updated_at: Some(Utc::now()),
                ..StoreSettings::default()
            })
            .clone())
    }

    async fn update(&self, input: StoreSettingsInput) -> Result<StoreSettings, SettingsError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(SettingsError::Network("store unavailable".to_string()));
        }
        let settings = input.into_settings(Utc::now());
        *self.settings.lock().await = Some(settings.clone());
        Ok(settings)
    }
}

// =============================================================================
// Cart Storage
// =============================================================================

/// Key-value cart storage shared between clones, like a browser's storage.
#[derive(Clone, Default)]
pub struct MemoryCartStorage {
    entries: Arc<Mutex<HashMap<String, String>>>,
    failing_saves: Arc<AtomicBool>,
}

impl MemoryCartStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn raw(&self, key: &str) -> Option<String> {
        self.entries.lock().await.get(key).cloned()
    }

    pub async fn put_raw(&self, key: &str, value: &str) {
        self.entries
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
    }

    pub fn set_failing_saves(&self, failing: bool) {
        self.failing_saves.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl CartStorage for MemoryCartStorage {
    async fn load(&self, key: &str) -> Result<Option<String>, CartStorageError> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn save(&self, key: &str, value: String) -> Result<(), CartStorageError> {
        if self.failing_saves.load(Ordering::SeqCst) {
            return Err(CartStorageError::Backend("quota exceeded".to_string()));
        }
        self.entries.lock().await.insert(key.to_string(), value);
        Ok(())
    }
}

// =============================================================================
// Hand-off and Refresh
// =============================================================================

/// Hand-off that records every message it is given.
#[derive(Default)]
pub struct RecordingHandoff {
    messages: Mutex<Vec<String>>,
}

impl RecordingHandoff {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Encoded messages handed off so far.
    pub async fn messages(&self) -> Vec<String> {
        self.messages.lock().await.clone()
    }
}

#[async_trait]
impl OrderHandoff for RecordingHandoff {
    async fn hand_off(&self, encoded_message: &str) -> String {
        self.messages.lock().await.push(encoded_message.to_string());
        format!("https://wa.me/5490000000000?text={encoded_message}")
    }
}

/// Refresh that only counts calls.
#[derive(Default)]
pub struct CountingRefresh {
    calls: AtomicUsize,
}

impl CountingRefresh {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CatalogRefresh for CountingRefresh {
    async fn refresh(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

// =============================================================================
// HTTP Test App
// =============================================================================

/// Password of the admin account in [`test_config`].
pub const TEST_ADMIN_PASSWORD: &str = "simea-test-password";

/// Storefront configuration for tests.
#[must_use]
pub fn test_config() -> StorefrontConfig {
    StorefrontConfig {
        database_url: SecretString::from("postgres://localhost/simea_test"),
        host: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port: 3000,
        base_url: "http://localhost:3000".to_string(),
        admin: AdminConfig {
            email: "admin@simea.com".to_string(),
            password_hash: SecretString::from(hash_password(TEST_ADMIN_PASSWORD).unwrap()),
        },
        catalog_cache_ttl: Duration::from_secs(300),
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
    }
}

/// The storefront wired to in-memory stores.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub catalog: Arc<InMemoryCatalogStore>,
    pub settings: Arc<InMemorySettingsStore>,
}

impl TestApp {
    pub fn new(catalog: InMemoryCatalogStore) -> Self {
        let config = test_config();
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/simea_test")
            .unwrap();
        let catalog = Arc::new(catalog);
        let settings = Arc::new(InMemorySettingsStore::new());

        let state = AppState::from_parts(
            config,
            pool,
            Arc::clone(&catalog) as Arc<dyn CatalogStore>,
            Arc::clone(&settings) as Arc<dyn SettingsStore>,
        );
        let router = app(state.clone(), session_layer(MemoryStore::default(), false)).unwrap();

        Self {
            router,
            state,
            catalog,
            settings,
        }
    }

    /// A client with its own cookie jar (one shopper).
    #[must_use]
    pub fn client(&self) -> TestClient {
        TestClient {
            router: self.router.clone(),
            cookie: None,
        }
    }
}

/// A JSON response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: Value,
}

/// Sends requests through the router, carrying the session cookie.
pub struct TestClient {
    router: Router,
    cookie: Option<String>,
}

impl TestClient {
    pub async fn get(&mut self, uri: &str) -> TestResponse {
        self.send(Method::GET, uri, None).await
    }

    pub async fn post(&mut self, uri: &str, body: Value) -> TestResponse {
        self.send(Method::POST, uri, Some(body)).await
    }

    pub async fn put(&mut self, uri: &str, body: Value) -> TestResponse {
        self.send(Method::PUT, uri, Some(body)).await
    }

    pub async fn delete(&mut self, uri: &str) -> TestResponse {
        self.send(Method::DELETE, uri, None).await
    }

    /// Log in as the test admin.
    pub async fn login_admin(&mut self) -> TestResponse {
        self.post(
            "/admin/login",
            serde_json::json!({ "login": "admin", "password": TEST_ADMIN_PASSWORD }),
        )
        .await
    }

    async fn send(&mut self, method: Method, uri: &str, body: Option<Value>) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = &self.cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let mut request = builder.body(body).unwrap();
        request
            .extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([127, 0, 0, 1], 40000))));

        let response = self.router.clone().oneshot(request).await.unwrap();

        if let Some(pair) = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
        {
            self.cookie = Some(pair.to_string());
        }

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };

        TestResponse {
            status,
            headers,
            body,
        }
    }
}
