use super::error::{UpstreamError, WeatherError};
use super::types::*;
use super::WeatherSource;
use crate::config::Config;
use crate::utils::{fahrenheit_to_celsius, format_location, is_plausible_celsius, round_to_one_decimal};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat};
use reqwest::{Client, StatusCode};

pub struct WeatherApiClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl WeatherApiClient {
    pub fn new(config: &Config) -> Result<Self, UpstreamError> {
        let client = Client::builder()
            .user_agent(concat!("WeatherProxy/", env!("CARGO_PKG_VERSION")))
            .timeout(config.weather_api_timeout)
            .build()?;

        Ok(Self {
            client,
            api_key: config.weather_api_key.clone(),
            base_url: config.weather_api_base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get_current(&self, location: &str) -> Result<CurrentResponse, WeatherError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(UpstreamError::KeyNotConfigured)?;

        let url = format!("{}/current.json", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("key", api_key), ("q", location), ("aqi", "no")])
            .send()
            .await
            .map_err(UpstreamError::from)?;

        match response.status() {
            status if status.is_success() => {
                let body = response.text().await.map_err(UpstreamError::from)?;
                serde_json::from_str(&body)
                    .map_err(|e| UpstreamError::Malformed(e.to_string()).into())
            }
            StatusCode::BAD_REQUEST => {
                tracing::debug!("Weather API rejected location {:?}", location);
                Err(WeatherError::LocationNotFound(location.to_string()))
            }
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(UpstreamError::Status {
                    status: status.as_u16(),
                    body,
                }
                .into())
            }
        }
    }
}

#[async_trait]
impl WeatherSource for WeatherApiClient {
    async fn fetch_current(
        &self,
        location: &str,
        unit: TemperatureUnit,
    ) -> Result<Observation, WeatherError> {
        let payload = self.get_current(location).await?;
        observation_from_payload(&payload, unit)
    }
}

/// Picks the temperature for `unit`, checks it is physically plausible and
/// converts the rest of the payload into display form.
pub fn observation_from_payload(
    payload: &CurrentResponse,
    unit: TemperatureUnit,
) -> Result<Observation, WeatherError> {
    let (temperature, celsius) = match unit {
        TemperatureUnit::Fahrenheit => (
            payload.current.temp_f,
            fahrenheit_to_celsius(payload.current.temp_f),
        ),
        TemperatureUnit::Celsius => (payload.current.temp_c, payload.current.temp_c),
    };

    if !is_plausible_celsius(celsius) {
        tracing::warn!(
            "Weather API returned implausible temperature {} {} for {}",
            temperature,
            unit.symbol(),
            payload.location.name
        );
        return Err(WeatherError::Validation("temperatureOutOfRange".to_string()));
    }

    let updated = DateTime::from_timestamp(payload.current.last_updated_epoch, 0).ok_or_else(|| {
        UpstreamError::Malformed(format!(
            "last_updated_epoch out of range: {}",
            payload.current.last_updated_epoch
        ))
    })?;

    Ok(Observation {
        temperature: round_to_one_decimal(temperature),
        unit: unit.symbol().to_string(),
        location: format_location(
            &payload.location.name,
            &payload.location.region,
            &payload.location.country,
        ),
        timestamp: updated.to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::SocketAddr;
    use std::time::Duration;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(base_url: &str, api_key: Option<&str>) -> Config {
        Config {
            weather_api_key: api_key.map(str::to_string),
            weather_api_base_url: base_url.to_string(),
            weather_api_timeout: Duration::from_secs(5),
            cache_ttl: Duration::from_secs(3600),
            cache_check_period: Duration::from_secs(60),
            server_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
        }
    }

    fn current_json(temp_c: f64, temp_f: f64) -> serde_json::Value {
        serde_json::json!({
            "location": {
                "name": "Madrid",
                "region": "Madrid",
                "country": "Spain",
                "localtime_epoch": 1792227600
            },
            "current": {
                "last_updated_epoch": 1792227600,
                "last_updated": "2026-10-17 11:00",
                "temp_c": temp_c,
                "temp_f": temp_f,
                "condition": { "text": "Clear" }
            }
        })
    }

    #[tokio::test]
    async fn test_fetch_current_celsius() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/current.json"))
            .and(query_param("key", "secret"))
            .and(query_param("q", "Madrid"))
            .and(query_param("aqi", "no"))
            .respond_with(ResponseTemplate::new(200).set_body_json(current_json(21.34, 70.4)))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = WeatherApiClient::new(&test_config(&mock_server.uri(), Some("secret"))).unwrap();
        let observation = client
            .fetch_current("Madrid", TemperatureUnit::Celsius)
            .await
            .unwrap();

        assert_eq!(observation.temperature, 21.3);
        assert_eq!(observation.unit, "°C");
        assert_eq!(observation.location, "Madrid, Madrid");
        assert_eq!(observation.timestamp, "2026-10-17T09:00:00.000Z");
    }

    #[tokio::test]
    async fn test_fetch_current_fahrenheit() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/current.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(current_json(21.34, 70.44)))
            .mount(&mock_server)
            .await;

        let client = WeatherApiClient::new(&test_config(&mock_server.uri(), Some("secret"))).unwrap();
        let observation = client
            .fetch_current("Madrid", TemperatureUnit::Fahrenheit)
            .await
            .unwrap();

        assert_eq!(observation.temperature, 70.4);
        assert_eq!(observation.unit, "°F");
    }

    #[tokio::test]
    async fn test_bad_request_means_unknown_location() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/current.json"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": { "code": 1006, "message": "No matching location found." }
            })))
            .mount(&mock_server)
            .await;

        let client = WeatherApiClient::new(&test_config(&mock_server.uri(), Some("secret"))).unwrap();
        let result = client.fetch_current("Xyzzy", TemperatureUnit::Celsius).await;

        assert!(matches!(result, Err(WeatherError::LocationNotFound(ref loc)) if loc == "Xyzzy"));
    }

    #[tokio::test]
    async fn test_server_error_is_upstream_failure() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/current.json"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .mount(&mock_server)
            .await;

        let client = WeatherApiClient::new(&test_config(&mock_server.uri(), Some("secret"))).unwrap();
        let result = client.fetch_current("Madrid", TemperatureUnit::Celsius).await;

        match result {
            Err(WeatherError::Upstream(UpstreamError::Status { status, body })) => {
                assert_eq!(status, 503);
                assert_eq!(body, "maintenance");
            }
            other => panic!("expected upstream status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_malformed_payload_is_upstream_failure() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/current.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{\"location\": {}}"))
            .mount(&mock_server)
            .await;

        let client = WeatherApiClient::new(&test_config(&mock_server.uri(), Some("secret"))).unwrap();
        let result = client.fetch_current("Madrid", TemperatureUnit::Celsius).await;

        assert!(matches!(result, Err(WeatherError::Upstream(UpstreamError::Malformed(_)))));
    }

    #[tokio::test]
    async fn test_missing_key_skips_request() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(current_json(20.0, 68.0)))
            .expect(0)
            .mount(&mock_server)
            .await;

        let client = WeatherApiClient::new(&test_config(&mock_server.uri(), None)).unwrap();
        let result = client.fetch_current("Madrid", TemperatureUnit::Celsius).await;

        assert!(matches!(
            result,
            Err(WeatherError::Upstream(UpstreamError::KeyNotConfigured))
        ));
    }

    #[test]
    fn test_implausible_temperature_rejected() {
        let payload: CurrentResponse = serde_json::from_value(current_json(65.0, 149.0)).unwrap();

        for unit in [TemperatureUnit::Celsius, TemperatureUnit::Fahrenheit] {
            let result = observation_from_payload(&payload, unit);
            assert!(matches!(result, Err(WeatherError::Validation(ref m)) if m == "temperatureOutOfRange"));
        }
    }

    #[test]
    fn test_region_falls_back_to_country() {
        let mut payload: CurrentResponse = serde_json::from_value(current_json(30.0, 86.0)).unwrap();
        payload.location.name = "Singapore".to_string();
        payload.location.region = String::new();
        payload.location.country = "Singapore".to_string();

        let observation = observation_from_payload(&payload, TemperatureUnit::Celsius).unwrap();
        assert_eq!(observation.location, "Singapore, Singapore");
    }
}
