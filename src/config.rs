use std::env;
use std::time::Duration;

#[derive(Clone)]
pub struct Config {
    /// May be blank; checked per request rather than at startup.
    pub weatherapi_key: String,
    pub weatherapi_base_url: String,
    pub host: String,
    pub port: u16,
    pub cache_max_capacity: u64,
    pub upstream_timeout: Duration,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Config::default();
        Ok(Config {
            weatherapi_key: env::var("WEATHERAPI_KEY").unwrap_or(defaults.weatherapi_key),
            weatherapi_base_url: env::var("WEATHERAPI_BASE_URL")
                .unwrap_or(defaults.weatherapi_base_url),
            host: env::var("HOST").unwrap_or(defaults.host),
            port: parse_var("PORT", defaults.port)?,
            cache_max_capacity: parse_var("CACHE_MAX_CAPACITY", defaults.cache_max_capacity)?,
            upstream_timeout: Duration::from_secs(parse_var(
                "UPSTREAM_TIMEOUT_SECS",
                defaults.upstream_timeout.as_secs(),
            )?),
        })
    }

    pub fn has_api_key(&self) -> bool {
        !self.weatherapi_key.trim().is_empty()
    }
}

fn parse_var<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{} has an invalid value {:?}: {}", name, raw, e)),
        Err(_) => Ok(default),
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            weatherapi_key: String::new(),
            weatherapi_base_url: "https://api.weatherapi.com".to_string(),
            host: "0.0.0.0".to_string(),
            port: 8080,
            cache_max_capacity: 1000,
            upstream_timeout: Duration::from_secs(30),
        }
    }
}
