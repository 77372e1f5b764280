// API Server Binary Entry Point
//
// Purpose: Load model artifacts and start the Axum API server
// Usage: cargo run --bin api_server

use agrosense::{create_router, AppState, ServerConfig};
use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing (structured logging)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| {
                    // Default log level: info for our crate, warn for others
                    "agrosense=info,tower_http=debug,axum=debug,warn".into()
                }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting API server...");

    let config = ServerConfig::from_env();

    tracing::info!("Configuration:");
    tracing::info!("  YIELD_MODEL: {:?}", config.models.yield_model);
    tracing::info!("  BEST_TIME_MODEL: {:?}", config.models.best_time_model);
    tracing::info!("  SOIL_MODEL: {:?}", config.models.soil_model);
    tracing::info!("  NOMINATIM_URL: {}", config.nominatim_url);
    tracing::info!("  PORT: {}", config.port);

    // Missing artifacts are logged and leave that endpoint returning 503
    let state = AppState::new(&config)?;
    tracing::info!("Application state initialized successfully");

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
