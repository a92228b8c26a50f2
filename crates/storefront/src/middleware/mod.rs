//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Security headers
//! 5. Session layer (tower-sessions with `PostgreSQL` store)
//! 6. Rate limiting (governor), per route group

pub mod auth;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use auth::{OptionalAdmin, RequireAdmin, clear_current_admin, set_current_admin};
pub use rate_limit::{
    RateLimitConfigError, admin_login_rate_limiter, api_rate_limiter, checkout_rate_limiter,
};
pub use request_id::{RequestId, request_id_middleware};
pub use security_headers::security_headers_middleware;
pub use session::{create_session_layer, session_layer};
