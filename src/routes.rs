use axum::{
    extract::{rejection::QueryRejection, Query, State},
    response::Json,
    routing::get,
    Router,
};
use serde::Serialize;
use std::sync::Arc;

use crate::{
    response::{success, ApiError, SuccessEnvelope},
    weather::{
        engine::WeatherService,
        error::WeatherError,
        types::{WeatherQuery, WeatherReading},
    },
};

// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub weather_service: Arc<WeatherService>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub version: String,
    pub cache_entries: u64,
}

// Route handlers
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        cache_entries: state.weather_service.cache().entry_count().await,
    })
}

pub async fn get_weather(
    State(state): State<AppState>,
    params: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<Json<SuccessEnvelope<WeatherReading>>, ApiError> {
    let Query(pairs) = params.map_err(|rejection| {
        tracing::debug!("Unreadable weather query: {}", rejection);
        ApiError::validation("locationRequired")
    })?;

    let query = WeatherQuery::from_pairs(&pairs).map_err(|e| match e {
        WeatherError::Validation(message) => ApiError::validation(message),
        other => ApiError::from(other),
    })?;

    let reading = state
        .weather_service
        .retrieve(&query.location, query.unit)
        .await
        .map_err(|e| {
            tracing::error!("Weather lookup for {} failed: {}", query.location, e);
            ApiError::from(e)
        })?;

    Ok(success(reading))
}

async fn route_not_found() -> ApiError {
    ApiError::route_not_found()
}

// Create the router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/v1/external/weather", get(get_weather))
        .fallback(route_not_found)
        .with_state(state)
}
