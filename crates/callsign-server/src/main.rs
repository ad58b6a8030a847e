//! Callsign Server — application entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use callsign_auth::AuthService;
use callsign_db::DbManager;
use callsign_server::AppState;
use callsign_server::config::ServerConfig;
use callsign_server::routes::create_router;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("callsign=info,tower_http=info")),
        )
        .json()
        .init();

    let config = ServerConfig::from_env()?;
    tracing::info!(port = config.port, "Starting Callsign server");

    let db = DbManager::connect(&config.db).await?;
    let auth = AuthService::new(db.users(), &config.auth)?;
    let app = create_router(Arc::new(AppState { auth }));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Callsign server stopped.");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}
