//! Core library for the `weather` aggregation backend.
//!
//! This crate defines:
//! - Location resolution from raw caller parameters
//! - The OpenWeather provider and the concurrent current/forecast fetch
//! - Aggregation of both payloads into one response with hazard alerts
//! - The responder that maps outcomes to a status code and JSON body
//!
//! It is used by `weather-cli`, but can also be embedded in other services.

pub mod aggregate;
pub mod config;
pub mod error;
pub mod location;
pub mod model;
pub mod provider;
pub mod respond;
pub mod service;

pub use config::Config;
pub use error::{Result, WeatherError};
pub use location::{LocationParams, LocationQuery};
pub use model::{AggregatedWeather, AlertSet, Coordinates, CurrentConditions, ForecastEntry};
pub use provider::{OpenWeatherProvider, UpstreamPayloads, WeatherProvider};
pub use respond::{ErrorBody, Reply};
pub use service::WeatherService;
