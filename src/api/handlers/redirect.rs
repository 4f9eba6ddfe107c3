//! Handler for short URL redirect.

use axum::{
    extract::{Path, State},
    response::Redirect,
};

use crate::error::AppError;
use crate::state::AppState;

/// Redirects a short code to its target URL.
///
/// # Endpoint
///
/// `GET /{code}`
///
/// # Request Flow
///
/// 1. Look the code up in the cache
/// 2. Confirm existence and expiry against the durable store (hit or miss)
/// 3. Count the click in the store
/// 4. On a miss, repopulate the cache
/// 5. Return 307 Temporary Redirect
///
/// A failing cache only costs latency; the store answers instead.
///
/// # Errors
///
/// Returns 404 Not Found if the short code doesn't exist.
/// Returns 410 Gone if the link has expired.
/// Returns 503 Service Unavailable if the store cannot be reached.
pub async fn redirect_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<Redirect, AppError> {
    let resolution = state.resolution_service.resolve(&code).await?;

    Ok(Redirect::temporary(&resolution.target_url))
}
