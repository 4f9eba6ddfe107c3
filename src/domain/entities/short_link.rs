//! Short link entity and the expiry policy applied at creation time.

use chrono::{DateTime, Duration, Utc};
use serde_json::json;

use crate::error::AppError;

/// Longest expiry a link may be created with.
pub const MAX_EXPIRY_DAYS: u32 = 3650;

/// A durable code → target mapping with click counters.
///
/// `code`, `target_url`, `is_custom_alias`, `created_at` and `expires_at` never
/// change after creation; only `click_count` and `last_clicked_at` move, and
/// only through an atomic store update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortLink {
    pub id: i64,
    pub code: String,
    pub target_url: String,
    pub is_custom_alias: bool,
    pub click_count: i64,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub last_clicked_at: Option<DateTime<Utc>>,
}

impl ShortLink {
    /// Returns true if `expires_at` is set and `now` has reached it.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|e| now >= e)
    }

    /// Whole days left until expiry, rounded up. `None` for links that never expire.
    pub fn days_left(&self, now: DateTime<Utc>) -> Option<i64> {
        self.expires_at.map(|e| {
            let remaining = (e - now).num_seconds().max(0);
            (remaining + 86_399) / 86_400
        })
    }
}

/// Input data for creating a new short link.
#[derive(Debug, Clone)]
pub struct NewShortLink {
    pub code: String,
    pub target_url: String,
    pub is_custom_alias: bool,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// How long a new link should live.
///
/// Keeps "caller said nothing" apart from "caller asked for no expiry".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExpiryPolicy {
    /// Use the configured default expiry period.
    #[default]
    Default,
    /// The link never expires.
    Never,
    /// The link expires this many days after creation.
    Days(u32),
}

impl ExpiryPolicy {
    /// Maps the wire representation of `expiry_days` onto a policy.
    ///
    /// - absent → [`ExpiryPolicy::Default`]
    /// - `null` → [`ExpiryPolicy::Never`]
    /// - `n` → [`ExpiryPolicy::Days`]
    pub fn from_request(expiry_days: Option<Option<u32>>) -> Self {
        match expiry_days {
            None => Self::Default,
            Some(None) => Self::Never,
            Some(Some(days)) => Self::Days(days),
        }
    }

    /// Computes `expires_at` for a link created at `now`.
    ///
    /// `default_days` is the configured default; `None` means the default is
    /// "never expires".
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the resolved period is zero days or
    /// longer than [`MAX_EXPIRY_DAYS`].
    pub fn expires_at(
        self,
        now: DateTime<Utc>,
        default_days: Option<u32>,
    ) -> Result<Option<DateTime<Utc>>, AppError> {
        let days = match self {
            Self::Default => match default_days {
                Some(days) => days,
                None => return Ok(None),
            },
            Self::Never => return Ok(None),
            Self::Days(days) => days,
        };

        if days == 0 || days > MAX_EXPIRY_DAYS {
            return Err(AppError::bad_request(
                format!("expiry_days must be between 1 and {}", MAX_EXPIRY_DAYS),
                json!({ "expiry_days": days }),
            ));
        }

        now.checked_add_signed(Duration::days(i64::from(days)))
            .map(Some)
            .ok_or_else(|| {
                AppError::bad_request(
                    "Expiry date is out of range",
                    json!({ "expiry_days": days }),
                )
            })
    }
}
