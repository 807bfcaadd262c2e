//! Rate limiting for authentication endpoints.
//!
//! Login and registration are the only endpoints worth brute-forcing,
//! so only the auth router carries a limiter. Keys on the client IP via
//! `SmartIpKeyExtractor`, which understands the usual proxy headers.

use std::sync::Arc;

use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use tower_governor::{
    GovernorLayer, governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor,
};

/// Rate limiter layer type for the auth router.
pub type RateLimiterLayer =
    GovernorLayer<SmartIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// Create the auth-endpoint rate limiter: ~10 requests per minute per
/// IP (replenish one token every 6 seconds, burst of 5).
///
/// # Panics
///
/// This function will not panic. The configuration uses only valid
/// positive integers (`per_second(6)` and `burst_size(5)`), which are
/// always accepted by `GovernorConfigBuilder`.
#[must_use]
pub fn auth_rate_limiter() -> RateLimiterLayer {
    let config = GovernorConfigBuilder::default()
        .key_extractor(SmartIpKeyExtractor)
        .per_second(6)
        .burst_size(5)
        .finish()
        .expect("rate limiter config with per_second(6) and burst_size(5) is valid");
    GovernorLayer::new(Arc::new(config))
}
