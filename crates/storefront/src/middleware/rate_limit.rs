//! Rate limiting middleware using governor and `tower_governor`.
//!
//! - `admin_login_rate_limiter`: strict limits for the admin login (~10/min)
//! - `checkout_rate_limiter`: checkout decrements stock, so it is kept slow (~20/min)
//! - `api_rate_limiter`: relaxed limits for the catalog and cart API (~100/min)

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::extract::ConnectInfo;
use axum::http::Request;
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use thiserror::Error;
use tower_governor::{GovernorError, GovernorLayer, governor::GovernorConfigBuilder};

// =============================================================================
// Client IP Key Extractor
// =============================================================================

/// Key extractor that trusts the usual reverse-proxy headers and falls back to
/// the peer address.
#[derive(Clone, Copy)]
pub struct ClientIpKeyExtractor;

fn header_ip<T>(req: &Request<T>, name: &str) -> Option<IpAddr> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .and_then(|s| s.trim().parse::<IpAddr>().ok())
}

impl tower_governor::key_extractor::KeyExtractor for ClientIpKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        header_ip(req, "x-forwarded-for")
            .or_else(|| header_ip(req, "x-real-ip"))
            .or_else(|| {
                req.extensions()
                    .get::<ConnectInfo<SocketAddr>>()
                    .map(|ConnectInfo(addr)| addr.ip())
            })
            .ok_or(GovernorError::UnableToExtractKey)
    }
}

// =============================================================================
// Rate Limiter Configuration
// =============================================================================

/// Rate limiter layer type for Axum.
pub type RateLimiterLayer =
    GovernorLayer<ClientIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// A limiter could not be built from its quota.
#[derive(Debug, Error)]
#[error("invalid rate limit quota: one request every {period_secs}s, burst {burst}")]
pub struct RateLimitConfigError {
    period_secs: u64,
    burst: u32,
}

fn rate_limiter(period_secs: u64, burst: u32) -> Result<RateLimiterLayer, RateLimitConfigError> {
    let config = GovernorConfigBuilder::default()
        .key_extractor(ClientIpKeyExtractor)
        .per_second(period_secs)
        .burst_size(burst)
        .finish()
        .ok_or(RateLimitConfigError { period_secs, burst })?;
    Ok(GovernorLayer::new(Arc::new(config)))
}

/// Admin login: 1 request every 6 seconds, burst of 5.
///
/// # Errors
///
/// Returns an error if the quota is rejected by governor.
pub fn admin_login_rate_limiter() -> Result<RateLimiterLayer, RateLimitConfigError> {
    rate_limiter(6, 5)
}

/// Checkout: 1 request every 3 seconds, burst of 5.
///
/// # Errors
///
/// Returns an error if the quota is rejected by governor.
pub fn checkout_rate_limiter() -> Result<RateLimiterLayer, RateLimitConfigError> {
    rate_limiter(3, 5)
}

/// General API: 1 request per second, burst of 50.
///
/// # Errors
///
/// Returns an error if the quota is rejected by governor.
pub fn api_rate_limiter() -> Result<RateLimiterLayer, RateLimitConfigError> {
    rate_limiter(1, 50)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tower_governor::key_extractor::KeyExtractor;

    use super::*;

    #[test]
    fn test_limiters_build() {
        assert!(admin_login_rate_limiter().is_ok());
        assert!(checkout_rate_limiter().is_ok());
        assert!(api_rate_limiter().is_ok());
    }

    #[test]
    fn test_forwarded_for_wins_over_peer() {
        let mut req = Request::builder()
            .header("x-forwarded-for", "203.0.113.7, 10.0.0.1")
            .body(())
            .unwrap();
        req.extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([127, 0, 0, 1], 9000))));

        let ip = ClientIpKeyExtractor.extract(&req).unwrap();
        assert_eq!(ip, "203.0.113.7".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn test_peer_address_fallback() {
        let mut req = Request::builder().body(()).unwrap();
        req.extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([192, 0, 2, 1], 9000))));

        let ip = ClientIpKeyExtractor.extract(&req).unwrap();
        assert_eq!(ip, "192.0.2.1".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn test_no_address_is_rejected() {
        let req = Request::builder().body(()).unwrap();
        assert!(ClientIpKeyExtractor.extract(&req).is_err());
    }
}
