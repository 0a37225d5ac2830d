use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// Point-in-time snapshot for the requested location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    #[serde(rename = "city")]
    pub place_name: String,
    #[serde(rename = "temp")]
    pub temperature_c: f64,
    #[serde(rename = "humidity")]
    pub humidity_pct: u8,
    #[serde(rename = "windSpeed")]
    pub wind_speed_mps: f64,
    #[serde(rename = "condition")]
    pub condition_text: String,
    #[serde(rename = "icon")]
    pub icon_url: String,
    #[serde(rename = "coords")]
    pub coordinates: Coordinates,
}

/// One caller-facing forecast sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastEntry {
    /// Provider timestamp text, e.g. `2024-06-01 12:00:00`.
    #[serde(rename = "date")]
    pub timestamp: String,
    #[serde(rename = "temp")]
    pub temperature_c: f64,
    #[serde(rename = "condition")]
    pub condition_text: String,
    #[serde(rename = "icon")]
    pub icon_url: String,
}

/// Ordered set of alert messages: insertion order kept, duplicates dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AlertSet(Vec<String>);

impl AlertSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` when the message was already present.
    pub fn insert(&mut self, message: impl Into<String>) -> bool {
        let message = message.into();
        if self.contains(&message) {
            return false;
        }
        self.0.push(message);
        true
    }

    pub fn contains(&self, message: &str) -> bool {
        self.0.iter().any(|m| m == message)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

/// Response root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedWeather {
    pub current: CurrentConditions,
    pub forecast: Vec<ForecastEntry>,
    pub alerts: AlertSet,
}
