//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                        - Liveness
//! GET  /health/ready                  - Database readiness
//!
//! # Catalog
//! GET  /api/categories                - Category list
//! GET  /api/products?category=<id>    - Product listing
//! GET  /api/products/{id}             - Product detail
//!
//! # Cart (session)
//! GET  /api/cart                      - Cart view
//! POST /api/cart/add                  - Add line
//! POST /api/cart/update               - Update quantity
//! POST /api/cart/remove               - Remove line
//! POST /api/cart/clear                - Empty cart
//! POST /api/cart/open                 - Open/close the cart panel
//! GET  /api/cart/count                - Item count badge
//!
//! # Checkout
//! GET  /api/checkout/payment-methods  - Enabled payment methods
//! POST /api/checkout                  - Deduct stock and hand off to WhatsApp
//!
//! # Admin
//! POST /admin/login                   - Login
//! POST /admin/logout                  - Logout
//! GET  /admin/session                 - Session status
//! GET  /admin/products                - Product list (requires admin)
//! POST /admin/products                - Create product (requires admin)
//! PUT  /admin/products/{id}           - Update product (requires admin)
//! DELETE /admin/products/{id}         - Delete product (requires admin)
//! POST /admin/products/{id}/stock     - Record offline sale (requires admin)
//! GET  /admin/settings                - Store settings (requires admin)
//! PUT  /admin/settings                - Replace settings (requires admin)
//! ```

pub mod admin;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod health;

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post, put},
};
use tower_http::trace::TraceLayer;
use tower_sessions::{SessionManagerLayer, SessionStore};

use crate::middleware::{
    RateLimitConfigError, admin_login_rate_limiter, api_rate_limiter, checkout_rate_limiter,
    request_id_middleware, security_headers_middleware,
};
use crate::state::AppState;

/// Create the catalog routes router.
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/categories", get(catalog::categories))
        .route("/products", get(catalog::index))
        .route("/products/{id}", get(catalog::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
        .route("/open", post(cart::set_open))
        .route("/count", get(cart::count))
}

/// Create the checkout routes router.
///
/// # Errors
///
/// Returns an error if the rate limiter cannot be built.
pub fn checkout_routes() -> Result<Router<AppState>, RateLimitConfigError> {
    Ok(Router::new()
        .route("/payment-methods", get(checkout::payment_methods))
        .route("/", post(checkout::checkout).layer(checkout_rate_limiter()?)))
}

/// Create the admin routes router.
///
/// # Errors
///
/// Returns an error if the rate limiter cannot be built.
pub fn admin_routes() -> Result<Router<AppState>, RateLimitConfigError> {
    Ok(Router::new()
        .route("/login", post(admin::login).layer(admin_login_rate_limiter()?))
        .route("/logout", post(admin::logout))
        .route("/session", get(admin::session_status))
        .route(
            "/products",
            get(admin::list_products).post(admin::create_product),
        )
        .route(
            "/products/{id}",
            put(admin::update_product).delete(admin::delete_product),
        )
        .route("/products/{id}/stock", post(admin::adjust_stock))
        .route(
            "/settings",
            get(admin::get_settings).put(admin::update_settings),
        ))
}

/// Create all routes for the storefront.
///
/// # Errors
///
/// Returns an error if a rate limiter cannot be built.
pub fn routes() -> Result<Router<AppState>, RateLimitConfigError> {
    let api = Router::new()
        .merge(catalog_routes())
        .nest("/cart", cart_routes())
        .nest("/checkout", checkout_routes()?)
        .layer(api_rate_limiter()?);

    Ok(Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/api", api)
        .nest("/admin", admin_routes()?))
}

/// Assemble the application with its middleware stack.
///
/// Rate limiters key on the client address, so the server must be run with
/// `into_make_service_with_connect_info::<SocketAddr>()`.
///
/// # Errors
///
/// Returns an error if a rate limiter cannot be built.
pub fn app<S>(state: AppState, session_layer: SessionManagerLayer<S>) -> Result<Router, RateLimitConfigError>
where
    S: SessionStore + Clone,
{
    Ok(routes()?
        .layer(session_layer)
        .layer(axum_middleware::from_fn(security_headers_middleware))
        .layer(axum_middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}
