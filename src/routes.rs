use axum::{
    extract::State,
    http::{Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Router,
};
use std::sync::Arc;
use thiserror::Error;
use tokio_util::task::TaskTracker;
use tower_http::trace::TraceLayer;

use crate::{
    config::Config,
    cors::with_cors,
    forecast::{
        cache::ResponseCache,
        types::{ForecastParams, ForecastQuery},
        weatherapi::{WeatherApiClient, WeatherApiError, CACHE_TTL},
    },
};

pub const FORECAST_ROUTE: &str = "/v1/forecast.json";

// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub weather_client: Arc<WeatherApiClient>,
    pub cache: Arc<dyn ResponseCache>,
    /// Owns the detached cache writes so shutdown and tests can drain them.
    pub background: TaskTracker,
}

#[derive(Error, Debug)]
pub enum ProxyError {
    #[error("Method Not Allowed")]
    MethodNotAllowed,
    #[error("Not Found")]
    RouteNotFound,
    #[error("Missing required query parameter: q")]
    MissingParameter,
    #[error("Proxy is not configured (missing WEATHERAPI_KEY)")]
    Misconfigured,
    #[error("Upstream request failed")]
    Upstream(#[from] WeatherApiError),
}

impl ProxyError {
    fn status(&self) -> StatusCode {
        match self {
            ProxyError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ProxyError::RouteNotFound => StatusCode::NOT_FOUND,
            ProxyError::MissingParameter => StatusCode::BAD_REQUEST,
            ProxyError::Misconfigured => StatusCode::INTERNAL_SERVER_ERROR,
            ProxyError::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        match &self {
            ProxyError::Upstream(e) => tracing::error!("Forecast fetch failed: {}", e),
            ProxyError::Misconfigured => tracing::debug!("Rejecting request: WEATHERAPI_KEY is not set"),
            _ => {}
        }
        (self.status(), self.to_string()).into_response()
    }
}

// Route handlers
pub async fn proxy_forecast(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
) -> Result<Response, ProxyError> {
    if method == Method::OPTIONS {
        return Ok(StatusCode::NO_CONTENT.into_response());
    }
    if method != Method::GET {
        return Err(ProxyError::MethodNotAllowed);
    }
    if !uri.path().ends_with(FORECAST_ROUTE) {
        return Err(ProxyError::RouteNotFound);
    }

    let params = ForecastParams::from_query(uri.query());
    let query = ForecastQuery::from_params(params).ok_or(ProxyError::MissingParameter)?;

    let api_key = state.config.weatherapi_key.trim();
    if api_key.is_empty() {
        return Err(ProxyError::Misconfigured);
    }

    let upstream_url = state.weather_client.forecast_url(api_key, &query);
    let cache_key = upstream_url.to_string();

    if let Some(cached) = state.cache.get(&cache_key).await {
        tracing::debug!(
            "Cache hit for q={:?}, fetched {}s ago",
            query.q,
            (chrono::Utc::now() - cached.fetched_at).num_seconds()
        );
        return Ok(cached.into_response());
    }

    tracing::debug!("Cache miss for q={:?}, fetching upstream", query.q);
    let fetched = state.weather_client.fetch_forecast(upstream_url).await?;

    let cache = state.cache.clone();
    let stored = fetched.clone();
    state.background.spawn(async move {
        if let Err(e) = cache.put(cache_key, stored, CACHE_TTL).await {
            tracing::warn!("Failed to store forecast in cache: {}", e);
        }
    });

    Ok(fetched.into_response())
}

// Create the router
pub fn create_router(state: AppState) -> Router {
    let router = Router::new()
        .fallback(proxy_forecast)
        .with_state(state);

    with_cors(router).layer(TraceLayer::new_for_http())
}
