//! # StyleStock Server
//!
//! HTTP backend for the StyleStock point-of-sale.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        StyleStock Server                                │
//! │                                                                         │
//! │  Browser ───► HTTP (3000) ───► Routes ───► stylestock-db ───► SQLite  │
//! │                  │                              │                       │
//! │                  ▼                              ▼                       │
//! │            Sessions (memory)              Change feed                   │
//! │                                          (SSE /api/events)             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod auth;
mod config;
mod error;
mod routes;
mod services;

use tracing::info;
use tracing_subscriber::EnvFilter;

use stylestock_db::{Database, DbConfig};

use crate::auth::SessionStore;
use crate::config::ServerConfig;
use crate::routes::AppState;
use crate::services::insight::InsightService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    info!("Starting StyleStock server...");

    // Load configuration
    let config = ServerConfig::load()?;
    info!(
        port = config.http_port,
        db_path = %config.db_path,
        ai_configured = config.ai_api_key.is_some(),
        "Configuration loaded"
    );

    // Connect to database (runs migrations)
    let db = Database::new(DbConfig::new(&config.db_path)).await?;
    info!("Database ready");

    // Seed default accounts on first boot
    auth::bootstrap_users(&db, &config).await?;

    let insights = InsightService::new(config.ai_api_key.clone(), config.ai_model.clone())?;

    // Create shared state
    let state = AppState {
        db,
        sessions: SessionStore::new(),
        insights,
    };

    let app = routes::build_app(state);

    let addr = config.listen_addr();
    info!(%addr, "Starting HTTP server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Initializes tracing from `RUST_LOG`, defaulting to INFO with debug
/// detail for our own crates.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("info,stylestock_server=debug,stylestock_db=debug,sqlx=warn")
    });

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}
