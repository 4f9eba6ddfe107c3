//! DTOs for link shortening endpoint.

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use validator::{Validate, ValidationError};

use crate::domain::entities::{MAX_EXPIRY_DAYS, ShortLink};

/// Compiled regex for custom alias validation.
static CUSTOM_ALIAS_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").unwrap());

/// First path segments owned by other routes.
const RESERVED_ALIASES: &[&str] = &["api", "health", "shorten", "analytics"];

/// Request to shorten a single URL.
///
/// `expiry_days` is tri-state on the wire:
///
/// | JSON                   | Meaning                       |
/// |------------------------|-------------------------------|
/// | field absent           | configured default expiry     |
/// | `"expiry_days": null`  | never expires                 |
/// | `"expiry_days": 7`     | expires 7 days after creation |
#[derive(Debug, Deserialize, Validate)]
#[validate(schema(function = "validate_expiry_days"))]
pub struct ShortenRequest {
    /// The target URL (must be absolute HTTP/HTTPS). Also accepted as `original_url`.
    #[serde(alias = "original_url")]
    #[validate(url(message = "Invalid URL format"))]
    #[validate(custom(function = "validate_http_scheme"))]
    pub url: String,

    /// Optional custom short code.
    #[validate(length(min = 3, max = 32))]
    #[validate(regex(
        path = "*CUSTOM_ALIAS_REGEX",
        message = "Alias may only contain letters, digits, '-' and '_'"
    ))]
    #[validate(custom(function = "validate_not_reserved"))]
    pub custom_alias: Option<String>,

    #[serde(default, with = "::serde_with::rust::double_option")]
    pub expiry_days: Option<Option<u32>>,
}

fn validate_http_scheme(url: &str) -> Result<(), ValidationError> {
    match url::Url::parse(url) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => Ok(()),
        _ => Err(ValidationError::new("url_scheme")
            .with_message("Only http and https URLs can be shortened".into())),
    }
}

fn validate_not_reserved(alias: &str) -> Result<(), ValidationError> {
    if RESERVED_ALIASES
        .iter()
        .any(|reserved| reserved.eq_ignore_ascii_case(alias))
    {
        return Err(ValidationError::new("reserved_alias")
            .with_message(format!("'{}' is a reserved path", alias).into()));
    }
    Ok(())
}

fn validate_expiry_days(request: &ShortenRequest) -> Result<(), ValidationError> {
    match request.expiry_days {
        Some(Some(days)) if days == 0 || days > MAX_EXPIRY_DAYS => {
            Err(ValidationError::new("expiry_days").with_message(
                format!("expiry_days must be between 1 and {}", MAX_EXPIRY_DAYS).into(),
            ))
        }
        _ => Ok(()),
    }
}

/// Metadata of a freshly created short link.
#[derive(Debug, Serialize)]
pub struct ShortenResponse {
    pub short_code: String,
    pub short_url: String,
    pub original_url: String,
    pub is_custom_alias: bool,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl ShortenResponse {
    pub fn new(link: ShortLink, short_url: String) -> Self {
        Self {
            short_code: link.code,
            short_url,
            original_url: link.target_url,
            is_custom_alias: link.is_custom_alias,
            created_at: link.created_at,
            expires_at: link.expires_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> ShortenRequest {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_expiry_days_tri_state() {
        let absent = parse(json!({ "url": "https://example.com" }));
        let null = parse(json!({ "url": "https://example.com", "expiry_days": null }));
        let days = parse(json!({ "url": "https://example.com", "expiry_days": 7 }));

        assert_eq!(absent.expiry_days, None);
        assert_eq!(null.expiry_days, Some(None));
        assert_eq!(days.expiry_days, Some(Some(7)));
    }

    #[test]
    fn test_accepts_original_url_field() {
        let request = parse(json!({ "original_url": "https://example.com/legacy" }));

        assert_eq!(request.url, "https://example.com/legacy");
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_valid_request() {
        let request = parse(json!({
            "url": "https://example.com/path?q=1",
            "custom_alias": "my_link-1",
            "expiry_days": 30
        }));

        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_rejects_non_http_url() {
        let request = parse(json!({ "url": "ftp://example.com/file" }));

        assert!(request.validate().is_err());
    }

    #[test]
    fn test_rejects_relative_url() {
        let request = parse(json!({ "url": "not a url" }));

        assert!(request.validate().is_err());
    }

    #[test]
    fn test_alias_rules() {
        for alias in ["ab", "has space", "slash/es", "api", "HEALTH", "shorten", "Analytics"] {
            let request = parse(json!({ "url": "https://example.com", "custom_alias": alias }));
            assert!(request.validate().is_err(), "alias {alias:?} should be rejected");
        }

        let long = "a".repeat(33);
        let request = parse(json!({ "url": "https://example.com", "custom_alias": long }));
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_expiry_days_bounds() {
        for days in [0, MAX_EXPIRY_DAYS + 1] {
            let request = parse(json!({ "url": "https://example.com", "expiry_days": days }));
            assert!(request.validate().is_err(), "{days} days should be rejected");
        }

        let request = parse(json!({ "url": "https://example.com", "expiry_days": MAX_EXPIRY_DAYS }));
        assert!(request.validate().is_ok());
    }
}
