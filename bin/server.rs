// Carbon Footprint Calculator - Web Server
// REST API + landing page with Axum

use anyhow::{Context, Result};
use carbon_footprint::{
    create_router, open_database, AppState, FootprintService, SeedData, ServerConfig,
    SqliteRepository,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "carbon_footprint=info,tower_http=debug,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("🌐 Carbon Footprint Calculator - Web Server");

    let config = ServerConfig::load()?;
    info!("Configuration:");
    info!("  DATABASE: {:?}", config.database_path);
    info!("  STATIC_DIR: {:?}", config.static_dir);
    info!("  ADDRESS: {}", config.address());

    // Open (and seed on first start) the reference database
    let seed = SeedData::embedded()?;
    let conn = open_database(&config.database_path, &seed)?;
    info!("✓ Database opened: {:?}", config.database_path);

    let repository = Arc::new(SqliteRepository::new(conn));
    let service = FootprintService::new(repository, config.app.clone());
    let app = create_router(AppState::new(service), Some(config.static_dir.clone()));

    let address = config.address();
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind to {address}"))?;

    info!("🚀 Server running on http://{address}");
    info!("   API: http://{address}/api/countries");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {e}");
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
}
