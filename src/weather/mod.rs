pub mod engine;
pub mod error;
#[cfg(test)]
pub mod mock;
pub mod types;
pub mod weatherapi;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::cache::ExpiringCache;
use crate::config::Config;
use error::WeatherError;
use types::*;

pub type ReadingCache = ExpiringCache<CachedReading>;

pub fn init_cache(config: &Config) -> ReadingCache {
    ExpiringCache::new(config.cache_ttl)
}

/// One entry per (location, unit) pair.
pub fn cache_key(location: &str, unit: TemperatureUnit) -> String {
    format!("weather:{}:{}", location, unit.as_str())
}

#[derive(Clone, Debug)]
pub struct CachedReading {
    pub observation: Observation,
    pub cached_at: DateTime<Utc>,
}

/// Source of current conditions for a free-text location.
#[async_trait]
pub trait WeatherSource: Send + Sync {
    async fn fetch_current(
        &self,
        location: &str,
        unit: TemperatureUnit,
    ) -> Result<Observation, WeatherError>;
}
