//! HTTP server initialization and runtime setup.
//!
//! Handles database connections, cache and GeoIP setup, the click worker, and
//! the Axum server lifecycle including graceful shutdown.

use crate::config::Config;
use crate::domain::click_event::ClickEvent;
use crate::domain::click_worker::run_click_worker;
use crate::infrastructure::cache::{CacheService, NullCache, RedisCache};
use crate::infrastructure::geoip::{GeoLookup, MaxMindGeoLookup, NullGeoLookup};
use crate::infrastructure::persistence::{
    PgAbTestRepository, PgClickRepository, PgLinkRepository, PgTokenRepository,
};
use crate::routes::app_router;
use crate::state::{AppState, Repositories, RequestSettings};

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use axum::http::HeaderName;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio::sync::mpsc;

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - PostgreSQL connection pool
/// - Apply migrations
/// - Redis cache (or NullCache fallback)
/// - GeoIP database (or no IP-based lookup)
/// - Background click worker
/// - Axum HTTP server
///
/// On SIGINT/SIGTERM the server stops accepting connections, finishes
/// in-flight requests, then waits for queued clicks to be written.
///
/// # Errors
///
/// Returns an error if:
/// - Database connection or migration fails
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime))
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;

    let cache = connect_cache(&config).await;
    let geo = open_geo(&config);

    let pool = Arc::new(pool);
    let repositories = pg_repositories(&pool);

    let (click_tx, click_rx) = mpsc::channel::<ClickEvent>(config.click_queue_capacity);
    let worker = tokio::spawn(run_click_worker(
        click_rx,
        repositories.clicks.clone(),
        config.click_worker_concurrency,
    ));
    tracing::info!(
        "Click worker started ({} concurrent inserts)",
        config.click_worker_concurrency
    );

    let settings = RequestSettings {
        behind_proxy: config.behind_proxy,
        geo_country_header: config
            .geo_country_header
            .as_deref()
            .map(HeaderName::try_from)
            .transpose()
            .context("GEO_COUNTRY_HEADER is not a valid header name")?,
    };

    let state = AppState::new(
        repositories,
        cache,
        geo,
        click_tx,
        config.token_signing_secret.clone(),
        settings,
    );

    let app = app_router(state);

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    // The router owned the last click senders; the worker drains and exits.
    if let Err(e) = worker.await {
        tracing::error!("Click worker panicked: {}", e);
    }
    tracing::info!("Shutdown complete");

    Ok(())
}

fn pg_repositories(pool: &Arc<PgPool>) -> Repositories {
    Repositories {
        links: Arc::new(PgLinkRepository::new(pool.clone())),
        ab_tests: Arc::new(PgAbTestRepository::new(pool.clone())),
        clicks: Arc::new(PgClickRepository::new(pool.clone())),
        tokens: Arc::new(PgTokenRepository::new(pool.clone())),
    }
}

async fn connect_cache(config: &Config) -> Arc<dyn CacheService> {
    let Some(redis_url) = &config.redis_url else {
        tracing::info!("Cache disabled (NullCache)");
        return Arc::new(NullCache::new());
    };

    match RedisCache::connect(redis_url, config.cache_ttl_seconds).await {
        Ok(redis) => {
            tracing::info!("Cache enabled (Redis, ttl {}s)", config.cache_ttl_seconds);
            Arc::new(redis)
        }
        Err(e) => {
            tracing::warn!("Failed to connect to Redis: {}. Using NullCache.", e);
            Arc::new(NullCache::new())
        }
    }
}

fn open_geo(config: &Config) -> Arc<dyn GeoLookup> {
    let Some(path) = &config.geoip_db_path else {
        return Arc::new(NullGeoLookup);
    };

    match MaxMindGeoLookup::open(path) {
        Ok(reader) => {
            tracing::info!("GeoIP database loaded from {}", path);
            Arc::new(reader)
        }
        Err(e) => {
            tracing::warn!(
                "Failed to open GeoIP database {}: {}. Geo targeting uses headers only.",
                path,
                e
            );
            Arc::new(NullGeoLookup)
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
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

    tracing::info!("Shutdown signal received, draining connections");
}
