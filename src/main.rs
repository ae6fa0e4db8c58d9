use std::sync::Arc;
use tokio_util::task::TaskTracker;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod cors;
mod forecast;
mod routes;

use config::Config;
use forecast::{init_cache, weatherapi::WeatherApiClient};
use routes::{create_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "weather_proxy=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    if !config.has_api_key() {
        tracing::warn!("WEATHERAPI_KEY is not set; forecast requests will fail with 500");
    }

    let weather_client = Arc::new(WeatherApiClient::new(
        &config.weatherapi_base_url,
        config.upstream_timeout,
    )?);
    let cache = Arc::new(init_cache(config.cache_max_capacity));
    let background = TaskTracker::new();
    let addr = format!("{}:{}", config.host, config.port);

    let state = AppState {
        config: Arc::new(config),
        weather_client,
        cache,
        background: background.clone(),
    };

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Weather proxy listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Let in-flight cache writes finish before exiting.
    background.close();
    background.wait().await;
    tracing::info!("Shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
