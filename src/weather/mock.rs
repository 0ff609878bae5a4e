use super::error::{UpstreamError, WeatherError};
use super::types::*;
use super::WeatherSource;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

#[derive(Clone, Debug)]
pub enum Scripted {
    Reading(Observation),
    Unreachable,
    UnknownLocation,
    Implausible,
}

/// Weather source that replays a scripted outcome and counts calls.
pub struct MockWeatherSource {
    outcome: Mutex<Scripted>,
    calls: AtomicUsize,
}

impl MockWeatherSource {
    pub fn new(outcome: Scripted) -> Self {
        Self {
            outcome: Mutex::new(outcome),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn returning(temperature: f64, unit: TemperatureUnit) -> Self {
        Self::new(Scripted::Reading(observation(temperature, unit)))
    }

    pub fn set_outcome(&self, outcome: Scripted) {
        *self.outcome.lock().unwrap() = outcome;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

pub fn observation(temperature: f64, unit: TemperatureUnit) -> Observation {
    Observation {
        temperature,
        unit: unit.symbol().to_string(),
        location: "Reykjavik, Capital Region".to_string(),
        timestamp: "2026-10-17T09:00:00.000Z".to_string(),
    }
}

#[async_trait]
impl WeatherSource for MockWeatherSource {
    async fn fetch_current(
        &self,
        location: &str,
        _unit: TemperatureUnit,
    ) -> Result<Observation, WeatherError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let outcome = self.outcome.lock().unwrap().clone();

        match outcome {
            Scripted::Reading(observation) => Ok(observation),
            Scripted::Unreachable => Err(UpstreamError::Status {
                status: 502,
                body: "bad gateway".to_string(),
            }
            .into()),
            Scripted::UnknownLocation => Err(WeatherError::LocationNotFound(location.to_string())),
            Scripted::Implausible => Err(WeatherError::Validation("temperatureOutOfRange".to_string())),
        }
    }
}
