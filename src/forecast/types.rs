use axum::{
    body::Bytes,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};

/// Query parameters accepted on the forecast route. All optional here;
/// `q` is validated by the handler.
#[derive(Debug, Default)]
pub struct ForecastParams {
    pub q: Option<String>,
    pub days: Option<String>,
    pub aqi: Option<String>,
    pub alerts: Option<String>,
}

impl ForecastParams {
    /// Parses a raw query string. When a parameter repeats, the first
    /// occurrence wins; unknown parameters are ignored.
    pub fn from_query(query: Option<&str>) -> Self {
        let mut params = Self::default();
        for (name, value) in url::form_urlencoded::parse(query.unwrap_or("").as_bytes()) {
            let slot = match &*name {
                "q" => &mut params.q,
                "days" => &mut params.days,
                "aqi" => &mut params.aqi,
                "alerts" => &mut params.alerts,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.into_owned());
            }
        }
        params
    }
}

/// Validated forecast query with defaults applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForecastQuery {
    pub q: String,
    pub days: String,
    pub aqi: String,
    pub alerts: String,
}

impl ForecastQuery {
    /// Returns `None` when `q` is missing or blank.
    pub fn from_params(params: ForecastParams) -> Option<Self> {
        let q = params.q.as_deref().map(str::trim).filter(|q| !q.is_empty())?;

        Some(Self {
            q: q.to_string(),
            days: non_empty_or(params.days, "1"),
            aqi: non_empty_or(params.aqi, "no"),
            alerts: non_empty_or(params.alerts, "no"),
        })
    }
}

fn non_empty_or(value: Option<String>, default: &str) -> String {
    value
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// A fully buffered upstream response. Held in the cache and replayed as-is.
#[derive(Debug, Clone)]
pub struct CachedResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
    pub fetched_at: chrono::DateTime<chrono::Utc>,
}

impl IntoResponse for CachedResponse {
    fn into_response(self) -> Response {
        (self.status, self.headers, self.body).into_response()
    }
}
