//! Error taxonomy for the aggregation pipeline.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WeatherError {
    /// Caller supplied neither coordinates nor a city.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Required secret (provider API key) is missing.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Provider answered with a non-success status.
    #[error("upstream responded with status {status}: {message}")]
    Upstream { status: u16, message: String },

    /// Provider unreachable, or its payload did not have the expected shape.
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),
}

impl WeatherError {
    pub fn invalid_input<S: Into<String>>(message: S) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration(message.into())
    }

    pub fn unavailable<S: Into<String>>(message: S) -> Self {
        Self::UpstreamUnavailable(message.into())
    }

    /// HTTP status classification reported to the caller.
    pub fn status_code(&self) -> u16 {
        match self {
            WeatherError::InvalidInput(_) => 400,
            WeatherError::Upstream { status, .. } if (400..600).contains(status) => *status,
            WeatherError::Upstream { .. }
            | WeatherError::Configuration(_)
            | WeatherError::UpstreamUnavailable(_) => 500,
        }
    }

    /// The only text that is ever handed back to a caller.
    pub fn public_message(&self) -> String {
        match self {
            WeatherError::InvalidInput(message) => message.clone(),
            WeatherError::Configuration(_) => "API Key is missing".to_string(),
            WeatherError::Upstream { message, .. } => {
                format!("Failed to fetch weather data: {message}")
            }
            WeatherError::UpstreamUnavailable(_) => "Internal Server Error".to_string(),
        }
    }
}

pub type Result<T, E = WeatherError> = std::result::Result<T, E>;
