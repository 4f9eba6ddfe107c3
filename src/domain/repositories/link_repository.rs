//! Repository trait for short link data access.

use crate::domain::entities::{NewShortLink, ShortLink};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// The durable store of short links.
///
/// The store is the source of truth for code uniqueness, expiry and click
/// counters. Implementations must enforce uniqueness with a constraint that
/// holds under concurrent inserts, and must update counters atomically.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgLinkRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::persistence::MemoryLinkRepository`] - in-process implementation
/// - Test mocks available with `cfg(test)`
///
/// # Examples
///
/// See integration tests: `tests/repository_link.rs`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Inserts a new short link with `click_count = 0`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::DuplicateCode`] if the code already exists, including
    /// when a concurrent insert of the same code wins the race.
    ///
    /// Returns [`AppError::Unavailable`] if the store cannot be reached.
    async fn create(&self, new_link: NewShortLink) -> Result<ShortLink, AppError>;

    /// Finds a link by its short code.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(ShortLink))` if found
    /// - `Ok(None)` if not found
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unavailable`] if the store cannot be reached.
    async fn find_by_code(&self, code: &str) -> Result<Option<ShortLink>, AppError>;

    /// Atomically increments `click_count` and sets `last_clicked_at`.
    ///
    /// A single store-side update; concurrent calls for the same code never
    /// lose an increment.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(ShortLink))` with the updated counters
    /// - `Ok(None)` if the code does not exist
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unavailable`] if the store cannot be reached.
    async fn record_click(
        &self,
        code: &str,
        clicked_at: DateTime<Utc>,
    ) -> Result<Option<ShortLink>, AppError>;

    /// Checks that the store is reachable.
    async fn ping(&self) -> Result<(), AppError>;
}
