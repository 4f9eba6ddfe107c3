//! Rate limiting middleware using token bucket algorithm.

use anyhow::{Context, Result};
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use std::sync::Arc;
use tower_governor::{
    GovernorLayer, governor::GovernorConfigBuilder, key_extractor::PeerIpKeyExtractor,
};

use crate::config::RateLimitConfig;

/// Per-IP rate limiter type used on the API routes.
pub type RateLimitLayer =
    GovernorLayer<PeerIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// Creates a rate limiter from the configured token bucket.
///
/// # Limits
///
/// - **Rate**: `config.per_second` requests per second (default: 2)
/// - **Burst**: `config.burst_size` requests (default: 100)
///
/// Requests exceeding the limit receive `429 Too Many Requests`.
///
/// # Key Extraction
///
/// Rate limits are applied per client IP address extracted from the
/// socket peer address, so the server must be started with
/// `into_make_service_with_connect_info::<SocketAddr>()`.
///
/// # Errors
///
/// Returns an error if the rate or the burst size is zero.
pub fn layer(config: RateLimitConfig) -> Result<RateLimitLayer> {
    let governor_conf = GovernorConfigBuilder::default()
        .per_second(config.per_second)
        .burst_size(config.burst_size)
        .finish()
        .context("Rate limit and burst size must be greater than zero")?;

    Ok(GovernorLayer::new(Arc::new(governor_conf)))
}
