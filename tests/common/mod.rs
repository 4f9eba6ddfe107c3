#![allow(dead_code)]

use async_trait::async_trait;
use axum::extract::ConnectInfo;
use chrono::{DateTime, TimeZone, Utc};
use snaplink::application::services::ResolutionService;
use snaplink::config::{CodeGeneratorConfig, RateLimitConfig, ResolutionConfig};
use snaplink::domain::clock::ManualClock;
use snaplink::domain::entities::{NewShortLink, ShortLink};
use snaplink::domain::repositories::LinkRepository;
use snaplink::error::AppError;
use snaplink::infrastructure::cache::{
    CacheError, CacheResult, CacheService, MemoryCache,
};
use snaplink::infrastructure::persistence::MemoryLinkRepository;
use snaplink::state::AppState;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower::Layer;

pub const BASE_URL: &str = "http://sl.test";

/// Service over the in-memory store and cache, driven by a manual clock.
pub struct TestContext {
    pub service: Arc<ResolutionService>,
    pub store: Arc<MemoryLinkRepository>,
    pub cache: Arc<MemoryCache>,
    pub clock: Arc<ManualClock>,
}

impl TestContext {
    pub fn state(&self) -> AppState {
        AppState::new(self.service.clone())
    }

    /// The full route table with a limit no test reaches.
    pub fn router(&self) -> axum::Router {
        let rate_limit = RateLimitConfig {
            per_second: 1,
            burst_size: 1_000,
        };
        snaplink::routes::router(self.state(), rate_limit)
            .unwrap()
            .layer(MockConnectInfoLayer)
    }
}

pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap()
}

pub fn resolution_config() -> ResolutionConfig {
    ResolutionConfig {
        cache_ttl: Duration::from_secs(3600),
        default_expiry_days: Some(30),
        base_url: BASE_URL.to_string(),
    }
}

pub fn create_test_context() -> TestContext {
    create_test_context_with(resolution_config())
}

pub fn create_test_context_with(config: ResolutionConfig) -> TestContext {
    let store = Arc::new(MemoryLinkRepository::new());
    let cache = Arc::new(MemoryCache::new(1_000));
    let clock = Arc::new(ManualClock::new(start_time()));

    let service = ResolutionService::new(
        store.clone(),
        cache.clone(),
        clock.clone(),
        CodeGeneratorConfig::default(),
        config,
    );

    TestContext {
        service: Arc::new(service),
        store,
        cache,
        clock,
    }
}

/// Service whose cache fails every call.
pub fn create_service_with_broken_cache() -> (Arc<ResolutionService>, Arc<MemoryLinkRepository>) {
    let store = Arc::new(MemoryLinkRepository::new());

    let service = ResolutionService::new(
        store.clone(),
        Arc::new(UnreachableCache),
        Arc::new(ManualClock::new(start_time())),
        CodeGeneratorConfig::default(),
        resolution_config(),
    );

    (Arc::new(service), store)
}

/// Service whose store fails every call, over a working in-memory cache.
pub fn create_service_with_broken_store() -> Arc<ResolutionService> {
    let service = ResolutionService::new(
        Arc::new(UnreachableStore),
        Arc::new(MemoryCache::new(1_000)),
        Arc::new(ManualClock::new(start_time())),
        CodeGeneratorConfig::default(),
        resolution_config(),
    );

    Arc::new(service)
}

pub struct UnreachableStore;

fn store_down() -> AppError {
    AppError::unavailable("Database unavailable", serde_json::json!({}))
}

#[async_trait]
impl LinkRepository for UnreachableStore {
    async fn create(&self, _new_link: NewShortLink) -> Result<ShortLink, AppError> {
        Err(store_down())
    }

    async fn find_by_code(&self, _code: &str) -> Result<Option<ShortLink>, AppError> {
        Err(store_down())
    }

    async fn record_click(
        &self,
        _code: &str,
        _clicked_at: DateTime<Utc>,
    ) -> Result<Option<ShortLink>, AppError> {
        Err(store_down())
    }

    async fn ping(&self) -> Result<(), AppError> {
        Err(store_down())
    }
}

pub struct UnreachableCache;

#[async_trait]
impl CacheService for UnreachableCache {
    async fn get_url(&self, _short_code: &str) -> CacheResult<Option<String>> {
        Err(CacheError::Unavailable("connection refused".to_string()))
    }

    async fn set_url(&self, _short_code: &str, _target_url: &str, _ttl: Duration) -> CacheResult<()> {
        Err(CacheError::Unavailable("connection refused".to_string()))
    }

    async fn invalidate(&self, _short_code: &str) -> CacheResult<()> {
        Err(CacheError::Unavailable("connection refused".to_string()))
    }

    async fn health_check(&self) -> bool {
        false
    }

    fn backend_name(&self) -> &'static str {
        "unreachable"
    }
}

/// Injects a fixed peer address, as `into_make_service_with_connect_info` would.
#[derive(Clone)]
pub struct MockConnectInfoLayer;

impl<S> Layer<S> for MockConnectInfoLayer {
    type Service = MockConnectInfoService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MockConnectInfoService { inner }
    }
}

#[derive(Clone)]
pub struct MockConnectInfoService<S> {
    inner: S,
}

impl<S, B> tower::Service<axum::http::Request<B>> for MockConnectInfoService<S>
where
    S: tower::Service<axum::http::Request<B>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    B: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: axum::http::Request<B>) -> Self::Future {
        let addr: SocketAddr = "127.0.0.1:12345".parse().unwrap();
        req.extensions_mut().insert(ConnectInfo(addr));
        self.inner.call(req)
    }
}
