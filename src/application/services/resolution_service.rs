//! Cache-then-store resolution, link creation and the analytics read path.
//!
//! The cache only ever answers "what is the target of this code". Expiry and
//! click accounting always go through the durable store, on a hit as well as
//! on a miss:
//!
//! ```text
//! resolve(code)
//!   cache hit  -> store.find  -> gone?    -> invalidate, NotFound
//!                             -> expired? -> invalidate, Expired
//!                             -> store.record_click -> cached target
//!   cache miss -> store.find  -> gone?    -> NotFound
//!                             -> expired? -> Expired
//!                             -> store.record_click -> cache.set -> target
//! ```
//!
//! Cache failures degrade to misses. Store failures end the request.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::json;
use tracing::{debug, error, info, warn};

use crate::application::services::CodeGenerator;
use crate::config::{CodeGeneratorConfig, ResolutionConfig};
use crate::domain::clock::Clock;
use crate::domain::entities::{ExpiryPolicy, NewShortLink, ShortLink};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::infrastructure::cache::CacheService;

/// Where a successful resolution found its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupSource {
    Cache,
    Store,
}

/// A successful resolution: redirect to `target_url` with 307.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub target_url: String,
    pub source: LookupSource,
}

/// Orchestrates the cache, the durable store and the code generator.
///
/// Holds no per-request state; one instance serves all concurrent requests.
pub struct ResolutionService {
    repository: Arc<dyn LinkRepository>,
    cache: Arc<dyn CacheService>,
    clock: Arc<dyn Clock>,
    code_generator: CodeGenerator,
    config: ResolutionConfig,
}

impl ResolutionService {
    pub fn new(
        repository: Arc<dyn LinkRepository>,
        cache: Arc<dyn CacheService>,
        clock: Arc<dyn Clock>,
        generator_config: CodeGeneratorConfig,
        config: ResolutionConfig,
    ) -> Self {
        let code_generator = CodeGenerator::new(repository.clone(), generator_config);

        Self {
            repository,
            cache,
            clock,
            code_generator,
            config,
        }
    }

    /// Resolves a short code to its target and counts the click.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the store does not know the code.
    /// Returns [`AppError::Expired`] if the link's `expires_at` has passed; the
    /// click counter is left untouched and any cached entry is invalidated.
    /// Returns [`AppError::Unavailable`] if the store cannot be reached.
    pub async fn resolve(&self, code: &str) -> Result<Resolution, AppError> {
        let now = self.clock.now();

        let outcome = match self.lookup_cache(code).await {
            Some(cached_url) => self.resolve_cached(code, cached_url, now).await,
            None => self.resolve_from_store(code, now).await,
        };

        let label = match &outcome {
            Ok(_) => "redirect",
            Err(AppError::NotFound { .. }) => "not_found",
            Err(AppError::Expired { .. }) => "expired",
            Err(_) => "error",
        };
        metrics::counter!("snaplink_resolutions_total", "outcome" => label).increment(1);

        outcome
    }

    async fn resolve_cached(
        &self,
        code: &str,
        cached_url: String,
        now: DateTime<Utc>,
    ) -> Result<Resolution, AppError> {
        let Some(link) = self.repository.find_by_code(code).await? else {
            warn!("Cache entry for {} has no stored link; invalidating", code);
            self.evict(code).await;
            return Err(link_not_found(code));
        };

        if link.is_expired_at(now) {
            info!("Link {} expired at {:?}; invalidating cache", code, link.expires_at);
            self.evict(code).await;
            return Err(link_expired(&link));
        }

        if self.repository.record_click(code, now).await?.is_none() {
            self.evict(code).await;
            return Err(link_not_found(code));
        }

        Ok(Resolution {
            target_url: cached_url,
            source: LookupSource::Cache,
        })
    }

    async fn resolve_from_store(
        &self,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<Resolution, AppError> {
        let link = self
            .repository
            .find_by_code(code)
            .await?
            .ok_or_else(|| link_not_found(code))?;

        if link.is_expired_at(now) {
            info!("Link {} expired at {:?}", code, link.expires_at);
            return Err(link_expired(&link));
        }

        if self.repository.record_click(code, now).await?.is_none() {
            return Err(link_not_found(code));
        }

        self.fill_cache(code, &link.target_url).await;

        Ok(Resolution {
            target_url: link.target_url,
            source: LookupSource::Store,
        })
    }

    /// Creates a short link and writes it through to the cache.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the expiry period is zero days or
    /// longer than [`crate::domain::entities::MAX_EXPIRY_DAYS`], whether it
    /// came from the caller or from the configured default.
    /// Returns [`AppError::AliasTaken`] if `custom_alias` is already in use,
    /// including when a concurrent request claims it first.
    /// Returns [`AppError::DuplicateCode`] if the store rejects a generated code
    /// that was free when reserved.
    /// Returns [`AppError::Unavailable`] if the store cannot be reached.
    pub async fn create(
        &self,
        target_url: String,
        custom_alias: Option<String>,
        expiry: ExpiryPolicy,
    ) -> Result<ShortLink, AppError> {
        let now = self.clock.now();
        let expires_at = expiry.expires_at(now, self.config.default_expiry_days)?;

        let code = self
            .code_generator
            .reserve_unique(custom_alias.as_deref())
            .await?;
        let is_custom_alias = custom_alias.is_some();

        let new_link = NewShortLink {
            code,
            target_url,
            is_custom_alias,
            created_at: now,
            expires_at,
        };

        let link = match self.repository.create(new_link).await {
            Ok(link) => link,
            Err(AppError::DuplicateCode { details, .. }) if is_custom_alias => {
                return Err(AppError::alias_taken("Custom alias already taken", details));
            }
            Err(e @ AppError::DuplicateCode { .. }) => {
                error!("Store rejected a reserved code: {}", e);
                return Err(e);
            }
            Err(e) => return Err(e),
        };

        info!(
            code = %link.code,
            custom = link.is_custom_alias,
            expires_at = ?link.expires_at,
            "Created short link"
        );

        self.fill_cache(&link.code, &link.target_url).await;

        Ok(link)
    }

    /// Reads a link's counters and timestamps without touching them.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the store does not know the code.
    pub async fn get_stats(&self, code: &str) -> Result<ShortLink, AppError> {
        self.repository
            .find_by_code(code)
            .await?
            .ok_or_else(|| link_not_found(code))
    }

    /// Constructs the fully-qualified short URL for a code.
    pub fn short_url(&self, code: &str) -> String {
        format!("{}/{}", self.config.base_url, code)
    }

    /// Current time of the service clock.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Checks that the durable store is reachable.
    pub async fn check_store(&self) -> Result<(), AppError> {
        self.repository.ping().await
    }

    /// Checks that the cache backend is reachable.
    pub async fn check_cache(&self) -> bool {
        self.cache.health_check().await
    }

    pub fn cache_backend(&self) -> &'static str {
        self.cache.backend_name()
    }

    /// Looks up the cache, treating any failure as a miss.
    async fn lookup_cache(&self, code: &str) -> Option<String> {
        match self.cache.get_url(code).await {
            Ok(Some(url)) => {
                debug!("Cache HIT for {}", code);
                metrics::counter!("snaplink_cache_lookups_total", "result" => "hit").increment(1);
                Some(url)
            }
            Ok(None) => {
                debug!("Cache MISS for {}", code);
                metrics::counter!("snaplink_cache_lookups_total", "result" => "miss").increment(1);
                None
            }
            Err(e) => {
                warn!("Cache lookup failed for {}, using store: {}", code, e);
                metrics::counter!("snaplink_cache_lookups_total", "result" => "error").increment(1);
                None
            }
        }
    }

    async fn fill_cache(&self, code: &str, target_url: &str) {
        if let Err(e) = self
            .cache
            .set_url(code, target_url, self.config.cache_ttl)
            .await
        {
            warn!("Failed to cache {}: {}", code, e);
        }
    }

    async fn evict(&self, code: &str) {
        if let Err(e) = self.cache.invalidate(code).await {
            warn!("Failed to invalidate cache entry {}: {}", code, e);
        }
    }
}

fn link_not_found(code: &str) -> AppError {
    AppError::not_found("Short URL not found", json!({ "code": code }))
}

fn link_expired(link: &ShortLink) -> AppError {
    AppError::expired(
        "This URL has expired",
        json!({ "code": link.code, "expired_at": link.expires_at }),
    )
}
