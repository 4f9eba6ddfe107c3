//! Handler for link analytics.

use axum::{
    Json,
    extract::{Path, State},
};

use crate::api::dto::analytics::AnalyticsResponse;
use crate::error::AppError;
use crate::state::AppState;

/// Returns click statistics for a short link.
///
/// # Endpoint
///
/// `GET /api/analytics/{code}`
///
/// Read-only: does not count as a click and is answered even for expired links.
///
/// # Errors
///
/// Returns 404 Not Found if the short code doesn't exist.
pub async fn analytics_handler(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<AnalyticsResponse>, AppError> {
    let service = &state.resolution_service;

    let link = service.get_stats(&code).await?;
    let short_url = service.short_url(&link.code);

    Ok(Json(AnalyticsResponse::new(link, short_url, service.now())))
}
