use serde::{Deserialize, Serialize};

use super::error::WeatherError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    Celsius,
    Fahrenheit,
}

impl TemperatureUnit {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "celsius" => Some(TemperatureUnit::Celsius),
            "fahrenheit" => Some(TemperatureUnit::Fahrenheit),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TemperatureUnit::Celsius => "celsius",
            TemperatureUnit::Fahrenheit => "fahrenheit",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            TemperatureUnit::Celsius => "°C",
            TemperatureUnit::Fahrenheit => "°F",
        }
    }
}

/// Validated inbound lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherQuery {
    pub location: String,
    pub unit: TemperatureUnit,
}

impl WeatherQuery {
    /// Builds a query from raw query-string pairs. `location` must appear
    /// exactly once and be non-blank; `unit` is optional and defaults to Celsius.
    pub fn from_pairs(pairs: &[(String, String)]) -> Result<Self, WeatherError> {
        let locations: Vec<&str> = values_of(pairs, "location");
        let location = match locations.as_slice() {
            [single] if !single.trim().is_empty() => single.to_string(),
            _ => return Err(WeatherError::Validation("locationRequired".to_string())),
        };

        let unit = match values_of(pairs, "unit").as_slice() {
            [] => TemperatureUnit::Celsius,
            [raw] => TemperatureUnit::parse(raw)
                .ok_or_else(|| WeatherError::Validation("invalidUnit".to_string()))?,
            _ => return Err(WeatherError::Validation("invalidUnit".to_string())),
        };

        Ok(Self { location, unit })
    }
}

fn values_of<'a>(pairs: &'a [(String, String)], name: &str) -> Vec<&'a str> {
    pairs
        .iter()
        .filter(|(key, _)| key == name)
        .map(|(_, value)| value.as_str())
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadingStatus {
    /// Served from a fresh fetch or a cache entry younger than 15 minutes.
    Online,
    /// Cache entry older than an hour, served because the refresh failed.
    Outdated,
    /// Cache entry served because the upstream could not be reached.
    Offline,
}

/// A single current-conditions observation, already converted for display.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub temperature: f64,
    pub unit: String,
    pub location: String,
    pub timestamp: String,
}

impl Observation {
    pub fn into_reading(self, status: ReadingStatus) -> WeatherReading {
        WeatherReading {
            temperature: self.temperature,
            unit: self.unit,
            location: self.location,
            timestamp: self.timestamp,
            status,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherReading {
    pub temperature: f64,
    pub unit: String,
    pub location: String,
    pub timestamp: String,
    pub status: ReadingStatus,
}

// WeatherAPI.com current.json payload
#[derive(Debug, Clone, Deserialize)]
pub struct CurrentResponse {
    pub location: CurrentLocation,
    pub current: CurrentConditions,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CurrentLocation {
    pub name: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub country: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CurrentConditions {
    pub temp_c: f64,
    pub temp_f: f64,
    pub last_updated_epoch: i64,
}
