//! HTTP server initialization and runtime setup.
//!
//! Handles store and cache selection, migrations, and the Axum server lifecycle.

use crate::application::services::ResolutionService;
use crate::config::{CacheBackend, Config};
use crate::domain::clock::SystemClock;
use crate::domain::repositories::LinkRepository;
use crate::infrastructure::cache::{CacheService, MemoryCache, NullCache, RedisCache};
use crate::infrastructure::persistence::{MemoryLinkRepository, PgLinkRepository};
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use metrics_exporter_prometheus::PrometheusBuilder;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - Durable store (PostgreSQL, or in-memory without `DATABASE_URL`)
/// - Apply migrations
/// - Cache backend (Redis, in-process or disabled)
/// - Prometheus recorder behind `/health/metrics`
/// - Axum HTTP server, stopped gracefully on Ctrl-C / SIGTERM
///
/// # Errors
///
/// Returns an error if:
/// - Database connection or migration fails
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let service = build_resolution_service(&config).await?;
    let mut state = AppState::new(Arc::new(service));

    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => state = state.with_metrics(handle),
        Err(e) => tracing::warn!("Metrics recorder not installed: {}", e),
    }

    let app = app_router(state, config.rate_limit_config())?;

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid LISTEN address '{}'", config.listen_addr))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server stopped");

    Ok(())
}

/// Wires the store, cache and clock into a [`ResolutionService`].
///
/// # Errors
///
/// Returns an error if the database is configured but unreachable, or if
/// migrations fail.
pub async fn build_resolution_service(config: &Config) -> Result<ResolutionService> {
    let repository = connect_store(config).await?;
    let cache = connect_cache(config).await;

    Ok(ResolutionService::new(
        repository,
        cache,
        Arc::new(SystemClock),
        config.code_generator_config(),
        config.resolution_config(),
    ))
}

async fn connect_store(config: &Config) -> Result<Arc<dyn LinkRepository>> {
    let Some(database_url) = &config.database_url else {
        tracing::warn!("No database configured; links are kept in memory and lost on restart");
        return Ok(Arc::new(MemoryLinkRepository::new()));
    };

    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime))
        .connect(database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;

    Ok(Arc::new(PgLinkRepository::new(Arc::new(pool))))
}

async fn connect_cache(config: &Config) -> Arc<dyn CacheService> {
    match config.cache_backend {
        CacheBackend::Redis => {
            let connected = match &config.redis_url {
                Some(redis_url) => RedisCache::connect(redis_url).await.map_err(|e| e.to_string()),
                None => Err("REDIS_URL is not set".to_string()),
            };

            match connected {
                Ok(redis) => {
                    tracing::info!("Cache enabled (Redis)");
                    Arc::new(redis)
                }
                Err(e) => {
                    tracing::warn!("Failed to connect to Redis: {}. Using in-process cache.", e);
                    Arc::new(MemoryCache::new(config.cache_max_capacity))
                }
            }
        }
        CacheBackend::Memory => {
            tracing::info!("Cache enabled (in-process, capacity {})", config.cache_max_capacity);
            Arc::new(MemoryCache::new(config.cache_max_capacity))
        }
        CacheBackend::None => {
            tracing::info!("Cache disabled (NullCache)");
            Arc::new(NullCache::new())
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Received shutdown signal, draining connections");
}
