//! Handler for the Prometheus scrape endpoint.

use axum::{
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};

use crate::state::AppState;

/// Renders resolution and cache counters in Prometheus text format.
///
/// # Endpoint
///
/// `GET /health/metrics`
///
/// # Response Codes
///
/// - **200 OK**: Exposition text
/// - **404 Not Found**: No recorder installed in this process
pub async fn metrics_handler(State(state): State<AppState>) -> Response {
    match state.metrics {
        Some(handle) => (
            [(
                header::CONTENT_TYPE,
                "text/plain; version=0.0.4; charset=utf-8",
            )],
            handle.render(),
        )
            .into_response(),
        None => (StatusCode::NOT_FOUND, "Metrics recorder is not installed").into_response(),
    }
}
