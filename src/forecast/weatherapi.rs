use super::types::*;
use axum::http::{
    header::{self, HeaderValue},
    HeaderMap,
};
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use url::Url;

const FORECAST_PATH: &str = "/v1/forecast.json";

/// Max age handed to intermediate caches and set on every forecast response.
pub const CACHE_TTL: Duration = Duration::from_secs(600);

pub const RESPONSE_CACHE_CONTROL: &str = "public, max-age=600";

// Connection-scoped headers that must not be replayed to the client.
const HOP_BY_HOP: [&str; 8] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

#[derive(Error, Debug)]
pub enum WeatherApiError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
    #[error("Invalid upstream base URL: {0}")]
    InvalidBaseUrl(#[from] url::ParseError),
}

pub struct WeatherApiClient {
    client: Client,
    forecast_endpoint: Url,
}

impl WeatherApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, WeatherApiError> {
        let client = Client::builder()
            .user_agent("WeatherProxy/1.0")
            .timeout(timeout)
            .build()?;

        let forecast_endpoint = Url::parse(&format!(
            "{}{}",
            base_url.trim_end_matches('/'),
            FORECAST_PATH
        ))?;

        Ok(Self {
            client,
            forecast_endpoint,
        })
    }

    /// Builds the secret-bearing upstream URL. Its string form doubles as the
    /// cache key, so parameter order is fixed.
    pub fn forecast_url(&self, api_key: &str, query: &ForecastQuery) -> Url {
        let mut url = self.forecast_endpoint.clone();
        url.query_pairs_mut()
            .append_pair("key", api_key)
            .append_pair("q", &query.q)
            .append_pair("days", &query.days)
            .append_pair("aqi", &query.aqi)
            .append_pair("alerts", &query.alerts);
        url
    }

    /// Single GET, no retries. Any upstream status is returned as-is; only
    /// transport failures are errors.
    pub async fn fetch_forecast(&self, url: Url) -> Result<CachedResponse, WeatherApiError> {
        let response = self
            .client
            .get(url)
            .header(
                header::CACHE_CONTROL,
                format!("max-age={}", CACHE_TTL.as_secs()),
            )
            .send()
            .await?;

        let status = response.status();
        let headers = passthrough_headers(response.headers());
        let body = response.bytes().await?;

        tracing::debug!(
            "Upstream responded {} with {} bytes",
            status,
            body.len()
        );

        Ok(CachedResponse {
            status,
            headers,
            body,
            fetched_at: chrono::Utc::now(),
        })
    }
}

fn passthrough_headers(upstream: &HeaderMap) -> HeaderMap {
    let mut headers = upstream.clone();
    for name in HOP_BY_HOP {
        headers.remove(name);
    }
    // Recomputed from the buffered body.
    headers.remove(header::CONTENT_LENGTH);
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static(RESPONSE_CACHE_CONTROL),
    );
    headers
}
