//! In-process cache backed by `moka`, with a TTL per entry.

use super::service::{CacheResult, CacheService};
use async_trait::async_trait;
use moka::future::Cache;
use moka::policy::Expiry;
use std::time::{Duration, Instant};
use tracing::debug;

#[derive(Debug, Clone)]
struct CachedTarget {
    url: String,
    ttl: Duration,
}

/// Expires each entry after the TTL it was written with.
///
/// Overwrites restart the clock, matching `SETEX` semantics in Redis.
struct WriteTtl;

impl Expiry<String, CachedTarget> for WriteTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &CachedTarget,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &CachedTarget,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// Bounded in-process cache.
///
/// Used when Redis is not configured and by the integration tests.
pub struct MemoryCache {
    inner: Cache<String, CachedTarget>,
}

impl MemoryCache {
    pub fn new(max_capacity: u64) -> Self {
        let inner = Cache::builder()
            .max_capacity(max_capacity)
            .expire_after(WriteTtl)
            .build();

        debug!("MemoryCache initialized with max capacity: {}", max_capacity);
        Self { inner }
    }
}

#[async_trait]
impl CacheService for MemoryCache {
    async fn get_url(&self, short_code: &str) -> CacheResult<Option<String>> {
        let url = self.inner.get(short_code).await.map(|entry| entry.url);

        match &url {
            Some(url) => debug!("Cache HIT: {} -> {}", short_code, url),
            None => debug!("Cache MISS: {}", short_code),
        }

        Ok(url)
    }

    async fn set_url(&self, short_code: &str, target_url: &str, ttl: Duration) -> CacheResult<()> {
        self.inner
            .insert(
                short_code.to_string(),
                CachedTarget {
                    url: target_url.to_string(),
                    ttl,
                },
            )
            .await;

        debug!(
            "Cache SET: {} -> {} (TTL: {}s)",
            short_code,
            target_url,
            ttl.as_secs()
        );
        Ok(())
    }

    async fn invalidate(&self, short_code: &str) -> CacheResult<()> {
        self.inner.invalidate(short_code).await;
        debug!("Cache INVALIDATE: {}", short_code);
        Ok(())
    }

    async fn health_check(&self) -> bool {
        true
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
