//! User Accounts Backend
//!
//! REST service for user registration, login and user management.
//!
//! ## Architecture
//!
//! The backend follows a layered architecture:
//! - Routes: HTTP request handling and routing
//! - Services: Auth gateway and user management
//! - Repositories: User store (PostgreSQL or in-memory) behind a timeout
//! - Workers: Periodic user counter

use anyhow::{Context, Result};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use user_accounts_backend::{
    config::{self, StoreBackend},
    db,
    repositories::{InMemoryUserStore, PgUserStore, TimeoutUserStore, UserStore},
    routes,
    state::AppState,
    workers,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    init_tracing();

    // Load and validate configuration (refuses to start without a JWT secret)
    let config = config::AppConfig::load()?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        env = if config::AppConfig::is_production() { "production" } else { "development" },
        "Starting User Accounts Backend"
    );

    let store = build_store(&config).await?;

    let state = match install_metrics() {
        Some(handle) => AppState::new(store.clone(), config.clone())?.with_metrics(handle),
        None => AppState::new(store.clone(), config.clone())?,
    };

    let counter = workers::spawn_user_counter(
        store,
        Duration::from_secs(config.workers.user_count_interval_secs),
    );

    // Build application
    let app = routes::create_router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!(address = %addr, "Server listening");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    // Serve with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    counter.shutdown().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Build the configured user store, bounded by the per-operation timeout
async fn build_store(config: &config::AppConfig) -> Result<Arc<dyn UserStore>> {
    let inner: Arc<dyn UserStore> = match config.database.backend {
        StoreBackend::Postgres => {
            info!("Connecting to database...");
            let pool =
                db::create_pool(&config.database.url, config.database.max_connections).await?;
            db::run_migrations(&pool).await?;
            Arc::new(PgUserStore::new(pool))
        }
        StoreBackend::Memory => {
            warn!("Using in-memory user store; data is lost on restart");
            Arc::new(InMemoryUserStore::new())
        }
    };

    Ok(Arc::new(TimeoutUserStore::new(
        inner,
        config.database.operation_timeout(),
    )))
}

/// Install the Prometheus recorder; the service keeps running without it
fn install_metrics() -> Option<PrometheusHandle> {
    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => Some(handle),
        Err(e) => {
            warn!(error = %e, "Failed to install metrics recorder; /metrics disabled");
            None
        }
    }
}

/// Initialize tracing/logging
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if config::AppConfig::is_production() {
            "user_accounts_backend=info,tower_http=info".into()
        } else {
            "user_accounts_backend=debug,tower_http=debug,sqlx=warn".into()
        }
    });

    let subscriber = tracing_subscriber::registry().with(env_filter);

    if config::AppConfig::is_production() {
        // JSON logging for production (better for log aggregation)
        subscriber
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        // Pretty logging for development
        subscriber
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
