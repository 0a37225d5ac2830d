//! Request pipeline: Resolver -> Fetcher -> Aggregator -> Responder.

use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::{
    aggregate::aggregate,
    config::Config,
    error::{Result, WeatherError},
    location::{LocationParams, resolve},
    model::AggregatedWeather,
    provider::{OpenWeatherProvider, WeatherProvider, fetch_both},
    respond::{Reply, respond},
};

/// Stateless between requests; cheap to clone and share across tasks.
#[derive(Debug, Clone)]
pub struct WeatherService {
    provider: Option<Arc<dyn WeatherProvider>>,
    icon_base_url: String,
}

impl WeatherService {
    pub fn new(provider: Arc<dyn WeatherProvider>, icon_base_url: impl Into<String>) -> Self {
        Self {
            provider: Some(provider),
            icon_base_url: icon_base_url.into(),
        }
    }

    /// A missing API key does not fail here; every request then fails with a
    /// configuration error instead.
    pub fn from_config(config: &Config) -> Result<Self> {
        let provider: Option<Arc<dyn WeatherProvider>> = match config.api_key() {
            Ok(_) => Some(Arc::new(OpenWeatherProvider::from_config(config)?)),
            Err(e) => {
                warn!(error = %e, "weather service started without an API key");
                None
            }
        };

        Ok(Self {
            provider,
            icon_base_url: config.openweather.icon_base_url.clone(),
        })
    }

    #[instrument(skip(self))]
    pub async fn weather(&self, params: &LocationParams) -> Result<AggregatedWeather> {
        let provider = self
            .provider
            .as_deref()
            .ok_or_else(|| WeatherError::configuration("API key is not configured"))?;

        let location = resolve(params)?;
        let payloads = fetch_both(provider, &location).await?;
        let weather = aggregate(&payloads, &self.icon_base_url);

        info!(
            %location,
            forecast_days = weather.forecast.len(),
            alerts = weather.alerts.len(),
            "aggregated weather"
        );
        Ok(weather)
    }

    /// Runs the pipeline and always produces a reply; errors never escape.
    pub async fn handle(&self, params: &LocationParams) -> Reply {
        let result = self.weather(params).await;
        if let Err(e) = &result {
            warn!(error = %e, status = e.status_code(), "weather request failed");
        }
        respond(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::LocationQuery;
    use crate::provider::openweather::tests::{current_json, forecast_json};
    use crate::provider::{OwCurrentResponse, OwForecastResponse};
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Debug, Default)]
    struct RecordingProvider {
        seen: Mutex<Vec<LocationQuery>>,
    }

    #[async_trait]
    impl WeatherProvider for RecordingProvider {
        async fn current(&self, location: &LocationQuery) -> Result<OwCurrentResponse> {
            self.seen.lock().unwrap().push(location.clone());
            Ok(serde_json::from_value(current_json(36.2, 15.0)).unwrap())
        }

        async fn forecast(&self, location: &LocationQuery) -> Result<OwForecastResponse> {
            self.seen.lock().unwrap().push(location.clone());
            let entries = [("2024-06-01 12:00:00", "Rain")];
            Ok(serde_json::from_value(forecast_json(&entries)).unwrap())
        }
    }

    #[tokio::test]
    async fn missing_api_key_fails_before_resolving() {
        let service = WeatherService::from_config(&Config::default()).unwrap();
        let reply = service.handle(&LocationParams::default()).await;

        assert_eq!(reply.status, 500);
        assert_eq!(reply.body["error"], "API Key is missing");
    }

    #[tokio::test]
    async fn missing_location_is_400_and_no_calls_made() {
        let provider = Arc::new(RecordingProvider::default());
        let service = WeatherService::new(provider.clone(), "icons");

        let reply = service.handle(&LocationParams::default()).await;

        assert_eq!(reply.status, 400);
        assert!(provider.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn both_calls_use_the_same_location() {
        let provider = Arc::new(RecordingProvider::default());
        let service = WeatherService::new(provider.clone(), "icons");

        let params = LocationParams {
            city: Some("Ignored".into()),
            lat: Some("10.5".into()),
            lon: Some("20.25".into()),
        };
        let reply = service.handle(&params).await;

        assert!(reply.is_success());
        let seen = provider.seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        let expected = LocationQuery::Coordinates {
            lat: 10.5,
            lon: 20.25,
        };
        assert!(seen.iter().all(|l| *l == expected));
    }

    #[tokio::test]
    async fn success_reply_contains_alerts_in_order() {
        let service = WeatherService::new(Arc::new(RecordingProvider::default()), "icons");
        let reply = service.handle(&LocationParams::city("Testville")).await;

        assert_eq!(reply.status, 200);
        assert_eq!(reply.body["alerts"].as_array().unwrap().len(), 3);
        assert_eq!(reply.body["forecast"][0]["icon"], "icons/10d.png");
    }
}
