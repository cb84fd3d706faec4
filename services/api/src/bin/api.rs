//! services/api/src/bin/api.rs

use api_lib::{
    adapters::NewsApiAdapter,
    config::Config,
    error::ApiError,
    web::{router, state::AppState},
};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    if config.news_api_key.is_none() {
        warn!("NEWS_API_KEY is not set; news requests will fail until it is configured");
    }

    // --- 2. Initialize the Upstream Adapter ---
    let provider = Arc::new(NewsApiAdapter::with_timeout(
        config.news_api_url.clone(),
        config.upstream_timeout,
    )?);
    info!("News provider client ready for {}", config.news_api_url);

    // --- 3. Build the Shared AppState and Router ---
    let app_state = Arc::new(AppState::new(config.clone(), provider));
    let app = router(app_state);

    // --- 4. Start the Server ---
    info!("Server running on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
