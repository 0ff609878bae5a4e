use thiserror::Error;

#[derive(Error, Debug)]
pub enum UpstreamError {
    #[error("weather API key is not configured")]
    KeyNotConfigured,
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
    #[error("API error: HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed weather payload: {0}")]
    Malformed(String),
}

impl UpstreamError {
    pub fn message_code(&self) -> &'static str {
        match self {
            UpstreamError::KeyNotConfigured => "weatherApiKeyNotConfigured",
            _ => "weatherApiRequestFailed",
        }
    }
}

#[derive(Error, Debug)]
pub enum WeatherError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("location not found: {0}")]
    LocationNotFound(String),
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

impl WeatherError {
    /// Whether a cached reading may be served in place of this failure.
    /// Implausible provider data is never papered over with the cache.
    pub fn allows_fallback(&self) -> bool {
        !matches!(self, WeatherError::Validation(_))
    }
}
