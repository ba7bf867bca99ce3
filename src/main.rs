//! Paybridge service entry point.
//!
//! Loads configuration, wires the store and gateways into the payment
//! manager, and serves the HTTP API until shutdown is requested.

use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use paybridge::adapters::http::{api_router, PaymentsAppState};
use paybridge::adapters::memory::InMemoryPaymentStore;
use paybridge::adapters::postgres::PostgresPaymentStore;
use paybridge::adapters::registry::build_gateways;
use paybridge::application::PaymentManager;
use paybridge::config::{AppConfig, StoreBackend};
use paybridge::ports::{PaymentGateway, PaymentStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    init_tracing(&config);
    config.validate()?;

    let store = build_store(&config).await?;
    let gateways = build_gateways(&config)?;
    tracing::info!(
        providers = ?gateways.iter().map(|g| g.provider_id().as_str()).collect::<Vec<_>>(),
        environment = ?config.server.environment,
        "starting paybridge"
    );

    let manager = Arc::new(PaymentManager::new(
        gateways,
        store,
        Some(config.server.public_base_url_trimmed().to_string()),
    ));

    let router = api_router(
        PaymentsAppState { manager },
        &config.server.cors_origins_list(),
        Duration::from_secs(config.server.request_timeout_secs),
    );

    let addr = config.server.socket_addr();
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("shutdown complete");
    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.server.log_level.clone()));
    let registry = tracing_subscriber::registry().with(filter);
    if config.is_production() {
        registry.with(fmt::layer().json().with_target(true)).init();
    } else {
        registry.with(fmt::layer().with_target(false)).init();
    }
}

async fn build_store(config: &AppConfig) -> Result<Arc<dyn PaymentStore>, Box<dyn std::error::Error>> {
    match config.database.backend {
        StoreBackend::Memory => {
            tracing::warn!("using in-memory payment store; records do not survive restart");
            Ok(Arc::new(InMemoryPaymentStore::new()))
        }
        StoreBackend::Postgres => {
            let pool = PgPoolOptions::new()
                .min_connections(config.database.min_connections)
                .max_connections(config.database.max_connections)
                .acquire_timeout(config.database.acquire_timeout())
                .idle_timeout(config.database.idle_timeout())
                .max_lifetime(config.database.max_lifetime())
                .connect(&config.database.url)
                .await?;
            if config.database.run_migrations {
                sqlx::migrate!("./migrations").run(&pool).await?;
                tracing::info!("database migrations applied");
            }
            Ok(Arc::new(PostgresPaymentStore::new(pool)))
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutdown signal received");
}
