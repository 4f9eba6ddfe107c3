//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET  /{code}`   - Short link redirect
//! - `GET  /health`   - Health check: store and cache
//! - `GET  /health/metrics` - Prometheus counters
//! - `/api/*`         - REST API (rate limited, CORS enabled)
//! - `POST /shorten`, `GET /analytics/{code}` - the API routes without the `/api` prefix
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Rate limiting** - Per-IP token bucket on the API
//! - **CORS** - Permissive, for browser frontends calling the API
//! - **Path normalization** - Trailing slash handling

use crate::api;
use crate::api::handlers::{health_handler, metrics_handler, redirect_handler};
use crate::api::middleware::{rate_limit, tracing};
use crate::config::RateLimitConfig;
use crate::state::AppState;
use anyhow::Result;
use axum::Router;
use axum::routing::get;
use tower::Layer;
use tower_http::cors::CorsLayer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Constructs the application router with all routes and middleware.
///
/// The rate limiter keys on the peer address, so the router must be served
/// with connect info.
///
/// # Errors
///
/// Returns an error if the rate limit configuration is invalid.
pub fn app_router(state: AppState, rate_limit: RateLimitConfig) -> Result<NormalizePath<Router>> {
    Ok(NormalizePathLayer::trim_trailing_slash().layer(router(state, rate_limit)?))
}

/// The route table of [`app_router`] without trailing-slash normalization.
///
/// The unprefixed API routes share one rate limiter with `/api/*`.
///
/// # Errors
///
/// Returns an error if the rate limit configuration is invalid.
pub fn router(state: AppState, rate_limit: RateLimitConfig) -> Result<Router> {
    let api_router = api::routes::api_routes()
        .layer(rate_limit::layer(rate_limit)?)
        .layer(CorsLayer::permissive());

    Ok(Router::new()
        .route("/{code}", get(redirect_handler))
        .route("/health", get(health_handler))
        .route("/health/metrics", get(metrics_handler))
        .merge(api_router.clone())
        .nest("/api", api_router)
        .with_state(state)
        .layer(tracing::layer()))
}
