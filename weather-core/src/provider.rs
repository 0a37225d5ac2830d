//! Upstream Fetcher: the provider seam and the concurrent two-call fetch.

use async_trait::async_trait;
use std::fmt::Debug;

use crate::{error::Result, location::LocationQuery};

pub mod openweather;

pub use openweather::{OpenWeatherProvider, OwCurrentResponse, OwForecastResponse};

#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// "Current conditions by location".
    async fn current(&self, location: &LocationQuery) -> Result<OwCurrentResponse>;

    /// "Forecast by location".
    async fn forecast(&self, location: &LocationQuery) -> Result<OwForecastResponse>;
}

/// Both upstream payloads, only ever built when both calls succeeded.
#[derive(Debug, Clone)]
pub struct UpstreamPayloads {
    pub current: OwCurrentResponse,
    pub forecast: OwForecastResponse,
}

/// Runs both provider calls concurrently and waits for both to settle.
///
/// Neither call is abandoned mid-flight: each reads its body to the end, so the
/// connection is released even when the sibling fails. If both fail, the
/// current-conditions failure is the one reported.
pub async fn fetch_both(
    provider: &dyn WeatherProvider,
    location: &LocationQuery,
) -> Result<UpstreamPayloads> {
    let current = provider.current(location);
    let forecast = provider.forecast(location);
    let (current, forecast) = tokio::join!(current, forecast);

    Ok(UpstreamPayloads {
        current: current?,
        forecast: forecast?,
    })
}
