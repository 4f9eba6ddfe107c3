//! Cache service trait and error types.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during cache operations.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache unavailable: {0}")]
    Unavailable(String),
    #[error("Cache operation error: {0}")]
    OperationError(String),
}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Trait for caching short code → target URL mappings.
///
/// A cache entry only accelerates the target lookup. It is never authoritative
/// for expiry: entries live on their own TTL clock, independent of the link's
/// `expires_at`.
///
/// Implementations report failures as [`CacheError`]; callers decide how to
/// degrade (see [`crate::application::services::ResolutionService`], which
/// treats every cache failure as a miss).
///
/// # Implementations
///
/// - [`crate::infrastructure::cache::RedisCache`] - Redis-backed cache
/// - [`crate::infrastructure::cache::MemoryCache`] - in-process cache with per-entry TTL
/// - [`crate::infrastructure::cache::NullCache`] - No-op implementation for disabled caching
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CacheService: Send + Sync {
    /// Retrieves the target URL for a short code.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(url))` on cache hit
    /// - `Ok(None)` on cache miss
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Unavailable`] if the backend cannot be reached.
    async fn get_url(&self, short_code: &str) -> CacheResult<Option<String>>;

    /// Stores a mapping, overwriting any existing entry.
    ///
    /// The TTL is measured from the time of this write.
    async fn set_url(&self, short_code: &str, target_url: &str, ttl: Duration) -> CacheResult<()>;

    /// Removes a cached mapping immediately.
    ///
    /// Used when logical expiry is detected so a stale entry stops serving.
    async fn invalidate(&self, short_code: &str) -> CacheResult<()>;

    /// Checks if the cache backend is healthy.
    ///
    /// Used by health check endpoints to report cache status.
    async fn health_check(&self) -> bool;

    /// Short backend name for logs and health output.
    fn backend_name(&self) -> &'static str;
}
