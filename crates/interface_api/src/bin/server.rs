//! School Fees Core - API Server Binary
//!
//! # Usage
//!
//! ```bash
//! API_DATABASE_URL=postgres://localhost/school_fees cargo run --bin fees-api
//! ```
//!
//! # Environment Variables
//!
//! * `API_HOST` - Server host (default: 0.0.0.0)
//! * `API_PORT` - Server port (default: 8080)
//! * `API_DATABASE_URL` - PostgreSQL connection string
//! * `API_LOG_LEVEL` - Log filter when `RUST_LOG` is unset (default: info)
//! * `API_CURRENCY` - ISO 4217 code fees are kept in (default: KES)
//! * `API_BALANCE_POLICY` - `billed_terms_only` or `include_unbilled_payments`

use anyhow::Context;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use domain_fees::FeeAccountService;
use infra_db::{create_pool, DatabaseConfig, DatabaseError, PostgresFeeAdapter};
use interface_api::{config::ApiConfig, create_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Local development convenience
    dotenvy::dotenv().ok();

    let config = ApiConfig::from_env().context("failed to read API_* configuration")?;
    config.validate()?;

    init_tracing(&config.log_level);

    tracing::info!(
        host = %config.host,
        port = config.port,
        currency = %config.currency,
        balance_policy = ?config.balance_policy,
        "Starting fees API server"
    );

    let pool = create_pool(DatabaseConfig::new(&config.database_url)).await?;

    sqlx::migrate!("../../migrations")
        .run(&pool)
        .await
        .map_err(DatabaseError::from)?;
    tracing::info!("Database migrations applied");

    let adapter = Arc::new(PostgresFeeAdapter::new(pool));
    let service = FeeAccountService::new(
        adapter.clone(),
        adapter.clone(),
        adapter.clone(),
        config.currency,
    )
    .with_policy(config.balance_policy);

    let addr: SocketAddr = config
        .server_addr()
        .parse()
        .with_context(|| format!("invalid server address {}", config.server_addr()))?;
    let app = create_router(AppState::new(service, adapter, config));

    tracing::info!(%addr, "Server listening");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Installs the fmt subscriber; `RUST_LOG` wins over the configured level
fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
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
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down"),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
