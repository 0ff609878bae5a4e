use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;

use crate::weather::error::WeatherError;

#[derive(Debug, Serialize)]
pub struct SuccessEnvelope<T> {
    pub data: T,
    pub status: &'static str,
}

pub fn success<T: Serialize>(data: T) -> Json<SuccessEnvelope<T>> {
    Json(SuccessEnvelope {
        data,
        status: "success",
    })
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
    pub status: u16,
}

/// Error that renders as the `{ code, message, status }` envelope.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", message)
    }

    pub fn location_not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, "LOCATION_NOT_FOUND", "locationNotFound")
    }

    pub fn external_api(message: impl Into<String>) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, "EXTERNAL_API_ERROR", message)
    }

    pub fn route_not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", "routeNotFound")
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            code: self.code,
            message: self.message,
            status: self.status.as_u16(),
        };
        (self.status, Json(body)).into_response()
    }
}

/// Maps failures coming out of the rule engine. Request validation happens
/// before the engine is called, so a `Validation` here means the provider
/// sent implausible data and is reported as an upstream failure.
impl From<WeatherError> for ApiError {
    fn from(err: WeatherError) -> Self {
        match err {
            WeatherError::LocationNotFound(_) => ApiError::location_not_found(),
            WeatherError::Upstream(upstream) => ApiError::external_api(upstream.message_code()),
            WeatherError::Validation(_) => ApiError::external_api("weatherApiRequestFailed"),
        }
    }
}
