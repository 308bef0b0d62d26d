use anyhow::{Context, Result};
use axum::{
    extract::DefaultBodyLimit,
    routing::{on, MethodFilter, MethodRouter},
    Router,
};
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::{
    cache,
    config::Config,
    handlers::{self, AppState},
    logs::LogService,
    metrics,
    routes::{Endpoint, Route, ROUTES},
    signals::setup_signal_handlers,
    store::SqliteLogStore,
};

/// Start the log service
///
/// This function:
/// 1. Connects the log store and the query cache
/// 2. Initializes metrics (if enabled)
/// 3. Spawns the cache sweeper
/// 4. Sets up signal handlers for graceful shutdown
/// 5. Serves requests until a shutdown signal arrives
pub async fn start_server(config: Config) -> Result<()> {
    let store = SqliteLogStore::connect(&config.database.url, config.database.max_connections)
        .await
        .context("Unable to connect to the log store")?;
    info!("Connected to log store");

    let cache = cache::connect(&config.cache.url, config.cache.max_entries)
        .await
        .context("Unable to connect to the query cache")?;
    info!(backend = %cache_backend_name(&config.cache.url), "Connected to query cache");

    let metrics_handle = if config.metrics.enabled {
        info!("Initializing Prometheus metrics...");
        Some(Arc::new(metrics::init_metrics().context("Failed to install metrics recorder")?))
    } else {
        None
    };

    let sweeper = cache::spawn_sweeper(
        cache.clone(),
        Duration::from_secs(config.cache.sweep_interval_seconds),
    );

    let (shutdown_tx, signal_handle) = setup_signal_handlers();
    let mut shutdown_rx = shutdown_tx.subscribe();

    let app_state = AppState {
        logs: LogService::new(Arc::new(store), cache),
        metrics: metrics_handle,
    };
    let app = create_router(app_state, config.server.body_limit_bytes)?;

    let addr = SocketAddr::from((
        config.server.host.parse::<std::net::IpAddr>()?,
        config.server.port,
    ));

    info!("Starting logvault on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.recv().await;
            info!("Shutdown signal received, draining connections...");
        })
        .await?;

    sweeper.abort();
    if let Err(e) = signal_handle.await {
        warn!("Signal handler task ended abnormally: {}", e);
    }
    info!("Server stopped gracefully");

    Ok(())
}

fn cache_backend_name(url: &str) -> &'static str {
    if url.starts_with("sqlite:") {
        "sqlite"
    } else {
        "memory"
    }
}

fn method_router(route: &Route) -> Result<MethodRouter<AppState>> {
    let filter = MethodFilter::try_from(route.method.clone()).map_err(|_| {
        anyhow::anyhow!("Route {} {} uses an unsupported method", route.method, route.path)
    })?;

    Ok(match route.endpoint {
        Endpoint::IngestLog => on(filter, handlers::logs::create_log),
        Endpoint::QueryLogs => on(filter, handlers::logs::list_logs),
        Endpoint::Health => on(filter, handlers::health::health_check),
        Endpoint::Ready => on(filter, handlers::health::readiness_check),
        Endpoint::Metrics => on(filter, handlers::metrics_handler::metrics),
    })
}

/// Build the axum router from the route table
///
/// Routes sharing a path are merged, so a known path with an unrouted
/// method answers 405 and unknown paths answer 404.
pub fn create_router(app_state: AppState, body_limit_bytes: usize) -> Result<Router> {
    let mut router = Router::new();
    for route in &ROUTES {
        router = router.route(route.path, method_router(route)?);
    }

    Ok(router
        .with_state(app_state)
        .layer(DefaultBodyLimit::max(body_limit_bytes))
        .layer(TraceLayer::new_for_http()))
}
