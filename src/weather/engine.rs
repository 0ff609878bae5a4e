use super::error::WeatherError;
use super::types::*;
use super::{cache_key, CachedReading, ReadingCache, WeatherSource};
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;

/// Cache entries younger than this are served without contacting the provider.
pub const FRESH_MINUTES: i64 = 15;
/// Cache entries older than this are reported as outdated when a refresh fails.
pub const STALE_MINUTES: i64 = 60;

/// Decides per lookup whether to serve the cache, refresh it, or degrade.
///
/// Concurrent lookups for the same key are not coalesced: each one that
/// misses the fresh window fetches on its own and the last write wins.
pub struct WeatherService {
    cache: ReadingCache,
    source: Arc<dyn WeatherSource>,
    clock: Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>,
}

impl WeatherService {
    pub fn new(cache: ReadingCache, source: Arc<dyn WeatherSource>) -> Self {
        Self {
            cache,
            source,
            clock: Arc::new(Utc::now),
        }
    }

    /// Replaces the wall clock used for ages and `cached_at` stamps.
    pub fn with_clock(mut self, clock: impl Fn() -> DateTime<Utc> + Send + Sync + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn cache(&self) -> &ReadingCache {
        &self.cache
    }

    pub async fn retrieve(
        &self,
        location: &str,
        unit: TemperatureUnit,
    ) -> Result<WeatherReading, WeatherError> {
        let key = cache_key(location, unit);
        let cached = self.cache.get(&key).await;

        if let Some(entry) = &cached {
            let age = (self.clock)().signed_duration_since(entry.cached_at);

            if age < Duration::minutes(FRESH_MINUTES) {
                tracing::debug!("Serving cached weather for {} ({}s old)", key, age.num_seconds());
                return Ok(entry.observation.clone().into_reading(ReadingStatus::Online));
            }

            if age > Duration::minutes(STALE_MINUTES) {
                return match self.fetch_and_store(&key, location, unit).await {
                    Ok(reading) => Ok(reading),
                    Err(e) if e.allows_fallback() => {
                        tracing::warn!("Refresh of stale {} failed, serving outdated reading: {}", key, e);
                        Ok(entry.observation.clone().into_reading(ReadingStatus::Outdated))
                    }
                    Err(e) => Err(e),
                };
            }
        }

        match self.fetch_and_store(&key, location, unit).await {
            Ok(reading) => Ok(reading),
            Err(e) => match cached {
                Some(entry) if e.allows_fallback() => {
                    tracing::warn!("Weather fetch for {} failed, serving offline reading: {}", key, e);
                    Ok(entry.observation.into_reading(ReadingStatus::Offline))
                }
                _ => {
                    tracing::error!("Weather fetch for {} failed with nothing cached: {}", key, e);
                    Err(e)
                }
            },
        }
    }

    async fn fetch_and_store(
        &self,
        key: &str,
        location: &str,
        unit: TemperatureUnit,
    ) -> Result<WeatherReading, WeatherError> {
        let observation = self.source.fetch_current(location, unit).await?;

        self.cache
            .set(
                key,
                CachedReading {
                    observation: observation.clone(),
                    cached_at: (self.clock)(),
                },
            )
            .await;
        tracing::debug!("Cached fresh weather for {}", key);

        Ok(observation.into_reading(ReadingStatus::Online))
    }
}
