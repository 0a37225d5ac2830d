//! Location Resolver: turns raw caller parameters into a validated [`LocationQuery`].

use crate::error::{Result, WeatherError};

/// Raw, unvalidated parameters as they arrive from the entry point.
#[derive(Debug, Clone, Default)]
pub struct LocationParams {
    pub city: Option<String>,
    pub lat: Option<String>,
    pub lon: Option<String>,
}

impl LocationParams {
    pub fn city(city: impl Into<String>) -> Self {
        Self {
            city: Some(city.into()),
            ..Self::default()
        }
    }

    pub fn coords(lat: impl ToString, lon: impl ToString) -> Self {
        Self {
            city: None,
            lat: Some(lat.to_string()),
            lon: Some(lon.to_string()),
        }
    }

    /// Builds params from raw query pairs. The first value of a repeated key wins and
    /// unknown keys are ignored.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut params = Self::default();

        for (key, value) in pairs {
            let slot = match key.as_ref() {
                "city" => &mut params.city,
                "lat" => &mut params.lat,
                "lon" => &mut params.lon,
                _ => continue,
            };
            slot.get_or_insert_with(|| value.into());
        }

        params
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LocationQuery {
    Coordinates { lat: f64, lon: f64 },
    City(String),
}

impl LocationQuery {
    /// Provider query parameters that select this location.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        match self {
            LocationQuery::Coordinates { lat, lon } => {
                vec![("lat", lat.to_string()), ("lon", lon.to_string())]
            }
            LocationQuery::City(city) => vec![("q", city.clone())],
        }
    }
}

impl std::fmt::Display for LocationQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LocationQuery::Coordinates { lat, lon } => write!(f, "{lat:.4},{lon:.4}"),
            LocationQuery::City(city) => f.write_str(city),
        }
    }
}

fn parse_coordinate(raw: Option<&str>) -> Option<f64> {
    raw.and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

/// Coordinates win whenever both parse; otherwise a non-empty city; otherwise `InvalidInput`.
///
/// The city text is passed through untouched.
pub fn resolve(params: &LocationParams) -> Result<LocationQuery> {
    let lat = parse_coordinate(params.lat.as_deref());
    let lon = parse_coordinate(params.lon.as_deref());

    if let (Some(lat), Some(lon)) = (lat, lon) {
        return Ok(LocationQuery::Coordinates { lat, lon });
    }

    match params.city.as_deref() {
        Some(city) if !city.trim().is_empty() => Ok(LocationQuery::City(city.to_string())),
        _ => Err(WeatherError::invalid_input("City or coordinates are required")),
    }
}
