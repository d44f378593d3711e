//! Nutrilink server entry point.
//!
//! Loads configuration, connects to PostgreSQL, wires the adapters into the
//! HTTP router and serves it until shutdown.

use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::EnvFilter;

use nutrilink::adapters::http::{api_router, EngagementAppState};
use nutrilink::adapters::postgres::{
    PostgresContractRepository, PostgresDietRepository, PostgresPartyDirectory,
};
use nutrilink::adapters::stripe::StripePaymentGateway;
use nutrilink::adapters::{SystemClock, TracingEventPublisher};
use nutrilink::config::{AppConfig, LogFormat, ServerConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    init_tracing(&config.server);
    config.validate()?;

    tracing::info!(
        environment = ?config.server.environment,
        test_mode = config.payment.is_test_mode(),
        "Starting nutrilink"
    );

    // Database
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
        tracing::info!("Database migrations applied");
    }

    // Adapters
    let payment_gateway = StripePaymentGateway::new(config.payment.stripe_config())?;
    let state = EngagementAppState {
        contracts: Arc::new(PostgresContractRepository::new(pool.clone())),
        diets: Arc::new(PostgresDietRepository::new(pool.clone())),
        parties: Arc::new(PostgresPartyDirectory::new(pool)),
        payment_gateway: Arc::new(payment_gateway),
        event_publisher: Arc::new(TracingEventPublisher::new()),
        clock: Arc::new(SystemClock),
        settings: config.engagement.clone(),
        default_currency: config.payment.default_currency.clone(),
    };

    let app = api_router(state, &config.server);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shut down");
    Ok(())
}

/// `RUST_LOG` wins over the configured level.
fn init_tracing(server: &ServerConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&server.log_level));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match server.log_format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}
