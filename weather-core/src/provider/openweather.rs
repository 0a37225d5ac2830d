use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::{debug, error, warn};

use crate::{
    config::Config,
    error::{Result, WeatherError},
    location::LocationQuery,
};

use super::WeatherProvider;

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String, base_url: impl Into<String>) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("weather-core/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                WeatherError::unavailable(format!("Failed to create HTTP client: {e}"))
            })?;

        Ok(Self {
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        })
    }

    /// Fails with a configuration error before any request when the key is missing.
    pub fn from_config(config: &Config) -> Result<Self> {
        let api_key = config.api_key()?;
        Self::new(api_key.to_owned(), config.openweather.base_url.clone())
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        location: &LocationQuery,
    ) -> Result<T> {
        let url = format!("{}/{endpoint}", self.base_url);
        debug!(endpoint, %location, "requesting OpenWeather");

        let res = self
            .http
            .get(&url)
            .query(&location.query_pairs())
            .query(&[("appid", self.api_key.as_str()), ("units", "metric")])
            .send()
            .await
            .map_err(|e| {
                error!(endpoint, error = %e, "OpenWeather request failed");
                WeatherError::unavailable(format!("OpenWeather {endpoint} request failed"))
            })?;

        let status = res.status();
        // Read the whole body even on failure so the connection goes back to the pool.
        let body = res.text().await.map_err(|e| {
            error!(endpoint, error = %e, "failed to read OpenWeather response body");
            WeatherError::unavailable(format!("Failed to read OpenWeather {endpoint} body"))
        })?;

        if !status.is_success() {
            let message = upstream_message(&body)
                .or_else(|| status.canonical_reason().map(str::to_string))
                .unwrap_or_else(|| "unknown error".to_string());
            warn!(endpoint, status = status.as_u16(), %message, "OpenWeather returned an error");
            return Err(WeatherError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            error!(endpoint, error = %e, "malformed OpenWeather payload");
            WeatherError::unavailable(format!("Failed to parse OpenWeather {endpoint} JSON"))
        })
    }
}

#[derive(Debug, Deserialize)]
struct OwErrorBody {
    message: Option<String>,
}

/// The provider's own `message` field, else the (truncated) raw body.
fn upstream_message(body: &str) -> Option<String> {
    let parsed = serde_json::from_str::<OwErrorBody>(body).ok();
    if let Some(message) = parsed.and_then(|b| b.message) {
        return Some(message);
    }
    let trimmed = body.trim();
    (!trimmed.is_empty()).then(|| truncate_body(trimmed))
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwWeather {
    pub main: String,
    pub description: String,
    pub icon: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwMain {
    pub temp: f64,
    pub humidity: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwWind {
    pub speed: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwCoord {
    pub lat: f64,
    pub lon: f64,
}

/// `GET /weather` payload, restricted to the fields the aggregator reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwCurrentResponse {
    pub name: String,
    pub main: OwMain,
    pub wind: OwWind,
    pub weather: Vec<OwWeather>,
    pub coord: OwCoord,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwForecastMain {
    pub temp: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwForecastEntry {
    pub dt_txt: String,
    pub main: OwForecastMain,
    #[serde(default)]
    pub weather: Vec<OwWeather>,
}

/// `GET /forecast` payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwForecastResponse {
    pub list: Vec<OwForecastEntry>,
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn current(&self, location: &LocationQuery) -> Result<OwCurrentResponse> {
        let parsed: OwCurrentResponse = self.get_json("weather", location).await?;

        if parsed.weather.is_empty() {
            error!("OpenWeather current payload has no weather conditions");
            return Err(WeatherError::unavailable("no weather conditions in payload"));
        }

        Ok(parsed)
    }

    async fn forecast(&self, location: &LocationQuery) -> Result<OwForecastResponse> {
        self.get_json("forecast", location).await
    }
}
