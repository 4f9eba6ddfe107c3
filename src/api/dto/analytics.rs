//! DTOs for link analytics.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::entities::ShortLink;

/// Click counters and timestamps of a single short link.
#[derive(Debug, Serialize)]
pub struct AnalyticsResponse {
    pub short_code: String,
    pub short_url: String,
    pub original_url: String,
    pub is_custom_alias: bool,
    pub click_count: i64,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub last_clicked_at: Option<DateTime<Utc>>,
    /// Same value as `last_clicked_at`, under the name older clients read.
    pub last_clicked: Option<DateTime<Utc>>,
    /// Whole days until expiry, rounded up; `0` once expired, `null` if the link never expires.
    pub days_left: Option<i64>,
}

impl AnalyticsResponse {
    pub fn new(link: ShortLink, short_url: String, now: DateTime<Utc>) -> Self {
        let days_left = link.days_left(now);

        Self {
            short_code: link.code,
            short_url,
            original_url: link.target_url,
            is_custom_alias: link.is_custom_alias,
            click_count: link.click_count,
            created_at: link.created_at,
            expires_at: link.expires_at,
            last_clicked_at: link.last_clicked_at,
            last_clicked: link.last_clicked_at,
            days_left,
        }
    }
}
