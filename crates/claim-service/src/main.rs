//! FRA Claim Service
//!
//! REST API for Gram Sabha claim lifecycle management

use anyhow::{Context, Result};
use claim_service::{create_router, AppState, Config};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "claim_service=debug,claim_lifecycle=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting FRA Claim Service");

    let config = Config::from_env().context("Failed to load configuration")?;
    info!("Storage backend: {:?}", config.storage_backend);

    let state = AppState::from_config(&config).await?;
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.api_address())
        .await
        .with_context(|| format!("Failed to bind to {}", config.api_address()))?;

    info!("FRA Claim Service running on http://{}", config.api_address());
    info!("Health check: http://{}/health", config.api_address());

    axum::serve(listener, app)
        .await
        .context("Server error")?;

    Ok(())
}
