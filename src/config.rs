use std::env;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct Config {
    pub weather_api_key: Option<String>,
    pub weather_api_base_url: String,
    pub weather_api_timeout: Duration,
    pub cache_ttl: Duration,
    pub cache_check_period: Duration,
    pub server_addr: SocketAddr,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Config {
            weather_api_key: env::var("WEATHER_API_KEY")
                .ok()
                .filter(|key| !key.trim().is_empty()),
            weather_api_base_url: env::var("WEATHER_API_BASE_URL")
                .unwrap_or_else(|_| "https://api.weatherapi.com/v1".to_string()),
            weather_api_timeout: Duration::from_secs(parse_var("WEATHER_API_TIMEOUT_SECS", 10)?),
            cache_ttl: Duration::from_secs(parse_var("WEATHER_CACHE_TTL_SECS", 24 * 60 * 60)?),
            cache_check_period: Duration::from_secs(parse_var(
                "WEATHER_CACHE_CHECK_PERIOD_SECS",
                10 * 60,
            )?),
            server_addr: parse_var("SERVER_ADDR", SocketAddr::from(([0, 0, 0, 0], 8080)))?,
        })
    }
}

fn parse_var<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("{} is invalid ({}): {}", name, raw, e)),
        Err(_) => Ok(default),
    }
}
