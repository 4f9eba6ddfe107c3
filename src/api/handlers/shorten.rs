//! Handler for link shortening endpoint.

use axum::{Json, extract::State};
use validator::Validate;

use crate::api::dto::shorten::{ShortenRequest, ShortenResponse};
use crate::domain::entities::ExpiryPolicy;
use crate::error::AppError;
use crate::state::AppState;

/// Creates a short link for a target URL.
///
/// # Endpoint
///
/// `POST /api/shorten`
///
/// # Request Body
///
/// ```json
/// {
///   "url": "https://example.com/some/long/path",
///   "custom_alias": "promo",   // optional
///   "expiry_days": 7           // optional; null = never expires
/// }
/// ```
///
/// # Response
///
/// ```json
/// {
///   "short_code": "promo",
///   "short_url": "http://localhost:8000/promo",
///   "original_url": "https://example.com/some/long/path",
///   "is_custom_alias": true,
///   "created_at": "2025-01-01T00:00:00Z",
///   "expires_at": "2025-01-08T00:00:00Z"
/// }
/// ```
///
/// # Errors
///
/// Returns 400 Bad Request if validation fails or the alias is taken.
/// Returns 503 Service Unavailable if the store cannot be reached.
pub async fn shorten_handler(
    State(state): State<AppState>,
    Json(payload): Json<ShortenRequest>,
) -> Result<Json<ShortenResponse>, AppError> {
    payload.validate()?;

    let expiry = ExpiryPolicy::from_request(payload.expiry_days);

    let link = state
        .resolution_service
        .create(payload.url, payload.custom_alias, expiry)
        .await?;

    let short_url = state.resolution_service.short_url(&link.code);

    Ok(Json(ShortenResponse::new(link, short_url)))
}
