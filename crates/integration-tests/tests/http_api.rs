//! End-to-end tests of the HTTP surface over in-memory stores.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use axum::http::StatusCode;
use serde_json::json;

use simea_core::catalog::seed_catalog;
use simea_core::checkout::{COMPLETED_NOTICE, DEGRADED_NOTICE};
use simea_integration_tests::{InMemoryCatalogStore, TestApp};

async fn stored_app() -> TestApp {
    TestApp::new(InMemoryCatalogStore::with_products(&seed_catalog()[..3]).await)
}

// =============================================================================
// Health and Catalog
// =============================================================================

#[tokio::test]
async fn test_health() {
    let app = TestApp::new(InMemoryCatalogStore::new());
    let response = app.client().get("/health").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, json!("ok"));
    assert!(response.headers.contains_key("x-request-id"));
    assert_eq!(response.headers["x-frame-options"], "DENY");
}

#[tokio::test]
async fn test_categories() {
    let app = TestApp::new(InMemoryCatalogStore::new());
    let response = app.client().get("/api/categories").await;

    assert_eq!(response.status, StatusCode::OK);
    let categories = response.body.as_array().unwrap();
    assert_eq!(categories.len(), 7);
    assert_eq!(categories[0]["id"], "todos");
}

#[tokio::test]
async fn test_products_fall_back_to_seed_catalog() {
    let app = TestApp::new(InMemoryCatalogStore::new());
    let mut client = app.client();

    let response = client.get("/api/products").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body.as_array().unwrap().len(), 8);

    let response = client.get("/api/products?category=bombachas").await;
    let products = response.body.as_array().unwrap();
    assert_eq!(products.len(), 2);
    assert!(products.iter().all(|p| p["category"] == "bombachas"));
}

#[tokio::test]
async fn test_product_detail() {
    let app = TestApp::new(InMemoryCatalogStore::new());
    let mut client = app.client();

    let response = client.get("/api/products/1").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["id"], 1);
    assert_eq!(response.body["availability"], "50 disponibles");
    assert_eq!(response.body["can_purchase"], true);

    let response = client.get("/api/products/99").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = client.get("/api/products/not-an-id").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

// =============================================================================
// Cart
// =============================================================================

#[tokio::test]
async fn test_cart_flow() {
    let app = TestApp::new(InMemoryCatalogStore::new());
    let mut client = app.client();

    let response = client.get("/api/cart").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["lines"], json!([]));
    assert_eq!(response.body["item_count"], 0);

    let response = client
        .post(
            "/api/cart/add",
            json!({ "product_id": "1", "size": "M", "quantity": 5 }),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["is_open"], true);
    let line = &response.body["lines"][0];
    assert_eq!(line["quantity"], 5);
    assert_eq!(line["tier"], "unit price");
    let line_id = line["id"].as_str().unwrap().to_string();

    // Same configuration merges; crossing 6 units switches tier.
    let response = client
        .post(
            "/api/cart/add",
            json!({ "product_id": "1", "size": "M", "quantity": 1 }),
        )
        .await;
    assert_eq!(response.body["lines"].as_array().unwrap().len(), 1);
    assert_eq!(response.body["lines"][0]["quantity"], 6);
    assert_eq!(response.body["lines"][0]["tier"], "wholesale price");

    let response = client
        .post("/api/cart/update", json!({ "line_id": line_id, "quantity": 12 }))
        .await;
    assert_eq!(response.body["lines"][0]["tier"], "bulk price");

    let response = client
        .post("/api/cart/update", json!({ "line_id": line_id, "quantity": 0 }))
        .await;
    assert_eq!(response.body["lines"][0]["quantity"], 12);

    let response = client.get("/api/cart/count").await;
    assert_eq!(response.body["count"], 12);

    let response = client
        .post("/api/cart/open", json!({ "open": false }))
        .await;
    assert_eq!(response.body["is_open"], false);

    let response = client
        .post("/api/cart/remove", json!({ "line_id": line_id }))
        .await;
    assert_eq!(response.body["lines"], json!([]));
    assert_eq!(response.body["total"], "0");
}

#[tokio::test]
async fn test_carts_are_per_session() {
    let app = TestApp::new(InMemoryCatalogStore::new());
    let mut alice = app.client();
    let mut bob = app.client();

    alice
        .post("/api/cart/add", json!({ "product_id": "2" }))
        .await;

    assert_eq!(alice.get("/api/cart/count").await.body["count"], 1);
    assert_eq!(bob.get("/api/cart/count").await.body["count"], 0);
}

#[tokio::test]
async fn test_add_rejects_unknown_options_and_sold_out() {
    let mut sold_out = seed_catalog().remove(0);
    sold_out.stock = 0;
    let app = TestApp::new(InMemoryCatalogStore::with_products(&[sold_out]).await);
    let mut client = app.client();

    let id = client.get("/api/products").await.body[0]["id"].clone();
    let response = client
        .post("/api/cart/add", json!({ "product_id": id }))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = client
        .post("/api/cart/add", json!({ "product_id": "1" }))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_add_rejects_size_not_offered() {
    let app = TestApp::new(InMemoryCatalogStore::new());
    let response = app
        .client()
        .post(
            "/api/cart/add",
            json!({ "product_id": "1", "size": "XXXL" }),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

// =============================================================================
// Checkout
// =============================================================================

#[tokio::test]
async fn test_checkout_empty_cart_is_rejected() {
    let app = TestApp::new(InMemoryCatalogStore::new());
    let response = app.client().post("/api/checkout", json!({})).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_checkout_deducts_stock_and_returns_link() {
    let app = stored_app().await;
    let mut client = app.client();

    let products = client.get("/api/products").await.body;
    let first = products[0]["id"].clone();
    let second = products[1]["id"].clone();

    client
        .post("/api/cart/add", json!({ "product_id": first, "quantity": 2 }))
        .await;
    client
        .post("/api/cart/add", json!({ "product_id": second, "quantity": 7 }))
        .await;

    let response = client
        .post("/api/checkout", json!({ "payment_method": "transferencia" }))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["outcome"]["status"], "completed");
    assert_eq!(response.body["notice"], COMPLETED_NOTICE);
    let link = response.body["handoff_link"].as_str().unwrap();
    assert!(link.starts_with("https://wa.me/5493794000000?text="));
    assert_eq!(response.body["stock_updates"].as_array().unwrap().len(), 2);
    assert_eq!(response.body["stock_updates"][0]["remaining"], 48);
    assert_eq!(response.body["stock_updates"][1]["remaining"], 43);

    let cart = client.get("/api/cart").await.body;
    assert_eq!(cart["lines"], json!([]));
    assert_eq!(cart["is_open"], false);

    // The refreshed catalog shows the new stock.
    let product = client
        .get(&format!("/api/products/{}", first.as_str().unwrap()))
        .await;
    assert_eq!(product.body["stock"], 48);
}

#[tokio::test]
async fn test_checkout_with_failing_decrement_is_degraded() {
    let app = stored_app().await;
    let mut client = app.client();

    let products = app.catalog.snapshot().await;
    app.catalog.fail_decrement(products[0].id).await;

    client
        .post(
            "/api/cart/add",
            json!({ "product_id": products[0].id.to_string() }),
        )
        .await;

    let response = client.post("/api/checkout", json!({})).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["outcome"]["status"], "completed_degraded");
    assert_eq!(response.body["notice"], DEGRADED_NOTICE);
    assert_eq!(client.get("/api/cart/count").await.body["count"], 0);
}

#[tokio::test]
async fn test_checkout_rejects_unknown_payment_method() {
    let app = TestApp::new(InMemoryCatalogStore::new());
    let mut client = app.client();

    client
        .post("/api/cart/add", json!({ "product_id": "1" }))
        .await;
    let response = client
        .post("/api/checkout", json!({ "payment_method": "bitcoin" }))
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(client.get("/api/cart/count").await.body["count"], 1);
}

#[tokio::test]
async fn test_payment_methods_follow_settings() {
    let app = TestApp::new(InMemoryCatalogStore::new());
    let mut client = app.client();

    let methods = client.get("/api/checkout/payment-methods").await.body;
    assert_eq!(methods.as_array().unwrap().len(), 4);

    client.login_admin().await;
    let response = client
        .put(
            "/admin/settings",
            json!({
                "store_name": "SIMEA Mayorista",
                "whatsapp_number": "+54 9 379 411-1111",
                "payment_methods": [
                    { "id": "efectivo", "name": "Efectivo", "description": "", "enabled": false },
                    { "id": "transferencia", "name": "Transferencia", "description": "CBU 123" }
                ]
            }),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let methods = client.get("/api/checkout/payment-methods").await.body;
    assert_eq!(methods, json!([{
        "id": "transferencia",
        "name": "Transferencia",
        "description": "CBU 123",
        "enabled": true
    }]));

    client
        .post("/api/cart/add", json!({ "product_id": "1" }))
        .await;
    let response = client.post("/api/checkout", json!({})).await;
    let link = response.body["handoff_link"].as_str().unwrap();
    assert!(link.starts_with("https://wa.me/5493794111111?text="));
    assert!(response.body["message"]
        .as_str()
        .unwrap()
        .contains("NUEVO PEDIDO - SIMEA Mayorista"));
}

// =============================================================================
// Admin
// =============================================================================

#[tokio::test]
async fn test_admin_routes_require_login() {
    let app = TestApp::new(InMemoryCatalogStore::new());
    let mut client = app.client();

    assert_eq!(
        client.get("/admin/products").await.status,
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(
        client.post("/admin/products", json!({})).await.status,
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(
        client.get("/admin/session").await.body,
        json!({ "authenticated": false })
    );
}

#[tokio::test]
async fn test_admin_login_rejects_wrong_password() {
    let app = TestApp::new(InMemoryCatalogStore::new());
    let response = app
        .client()
        .post(
            "/admin/login",
            json!({ "login": "admin", "password": "wrong-password" }),
        )
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["error"], "Invalid credentials");
}

#[tokio::test]
async fn test_admin_product_lifecycle() {
    let app = TestApp::new(InMemoryCatalogStore::new());
    let mut client = app.client();

    let response = client.login_admin().await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["email"], "admin@simea.com");

    let response = client
        .post(
            "/admin/products",
            json!({
                "name": "Pijama Satén",
                "category": "pijamas",
                "sizes": ["S", "M"],
                "colors": ["Rosa"],
                "stock": "15",
                "pricing": { "unit": 5200, "wholesale": "4800", "bulk": 4500 }
            }),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED);
    let id = response.body["id"].as_str().unwrap().to_string();
    assert_eq!(response.body["stock"], 15);

    let listed = client.get("/api/products").await.body;
    assert_eq!(listed[0]["id"], id.as_str());

    let response = client
        .put(
            &format!("/admin/products/{id}"),
            json!({ "name": "Pijama Satén Largo", "stock": 4, "pricing": { "unit": 5600 } }),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let shown = client.get(&format!("/api/products/{id}")).await.body;
    assert_eq!(shown["name"], "Pijama Satén Largo");
    assert_eq!(shown["availability"], "Últimas 4 unidades");

    let response = client
        .post(&format!("/admin/products/{id}/stock"), json!({ "sold": 10 }))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["remaining"], 0);

    let response = client.delete(&format!("/admin/products/{id}")).await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);
    assert_eq!(
        client.get(&format!("/api/products/{id}")).await.status,
        StatusCode::NOT_FOUND
    );

    let response = client.post("/admin/logout", json!({})).await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);
    assert_eq!(
        client.get("/admin/products").await.status,
        StatusCode::UNAUTHORIZED
    );
}

#[tokio::test]
async fn test_admin_store_failure_is_reported() {
    let app = TestApp::new(InMemoryCatalogStore::new());
    let mut client = app.client();
    client.login_admin().await;

    app.catalog.set_unavailable(true);
    let response = client
        .post("/admin/products", json!({ "name": "x" }))
        .await;

    assert_eq!(response.status, StatusCode::BAD_GATEWAY);
    assert_eq!(response.body["error"], "Store backend unavailable");
}

#[tokio::test]
async fn test_settings_validation() {
    let app = TestApp::new(InMemoryCatalogStore::new());
    let mut client = app.client();
    client.login_admin().await;

    let response = client
        .put(
            "/admin/settings",
            json!({ "store_name": " ", "whatsapp_number": "123", "payment_methods": [] }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let settings = client.get("/admin/settings").await.body;
    assert_eq!(settings["store_name"], "SIMEA");
}
