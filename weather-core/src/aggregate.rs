//! Aggregator: fuses the two upstream payloads and derives hazard alerts.
//!
//! Everything here is pure; identical inputs always give identical output.

use chrono::NaiveDateTime;
use std::collections::HashSet;

use crate::{
    model::{AggregatedWeather, AlertSet, Coordinates, CurrentConditions, ForecastEntry},
    provider::{
        UpstreamPayloads,
        openweather::{OwCurrentResponse, OwForecastEntry, OwForecastResponse, OwWeather},
    },
};

pub const RAIN_ALERT: &str =
    "Rain is expected in the next 24 hours. Consider carrying an umbrella.";
pub const HEAT_ALERT: &str = "Heatwave warning: Stay hydrated and avoid direct sun exposure.";
pub const WIND_ALERT: &str = "High winds warning: Secure loose objects outdoors.";

/// Eight 3-hour samples, roughly the next 24 hours.
pub const FORECAST_WINDOW_LEN: usize = 8;
pub const HEAT_THRESHOLD_C: f64 = 35.0;
pub const WIND_THRESHOLD_KMH: f64 = 50.0;
const MPS_TO_KMH: f64 = 3.6;

const NOON_MARKER: &str = "12:00:00";

pub fn aggregate(payloads: &UpstreamPayloads, icon_base_url: &str) -> AggregatedWeather {
    let window = forecast_window(&payloads.forecast);

    AggregatedWeather {
        current: current_conditions(&payloads.current, icon_base_url),
        forecast: daily_forecast(&payloads.forecast, icon_base_url),
        alerts: derive_alerts(window, &payloads.current),
    }
}

pub fn current_conditions(current: &OwCurrentResponse, icon_base_url: &str) -> CurrentConditions {
    let (condition_text, icon) = describe(current.weather.first());

    CurrentConditions {
        place_name: current.name.clone(),
        temperature_c: current.main.temp,
        humidity_pct: current.main.humidity,
        wind_speed_mps: current.wind.speed,
        condition_text,
        icon_url: format!("{icon_base_url}/{icon}@2x.png"),
        coordinates: Coordinates {
            lat: current.coord.lat,
            lon: current.coord.lon,
        },
    }
}

/// The noon sample of each day, at most one per calendar day, in feed order.
pub fn daily_forecast(forecast: &OwForecastResponse, icon_base_url: &str) -> Vec<ForecastEntry> {
    let mut seen_days = HashSet::new();

    forecast
        .list
        .iter()
        .filter(|entry| entry.dt_txt.contains(NOON_MARKER))
        .filter_map(|entry| entry.weather.first().map(|weather| (entry, weather)))
        .filter(|(entry, _)| seen_days.insert(calendar_day(&entry.dt_txt)))
        .map(|(entry, weather)| ForecastEntry {
            timestamp: entry.dt_txt.clone(),
            temperature_c: entry.main.temp,
            condition_text: weather.description.clone(),
            icon_url: format!("{icon_base_url}/{}.png", weather.icon),
        })
        .collect()
}

pub fn forecast_window(forecast: &OwForecastResponse) -> &[OwForecastEntry] {
    let len = forecast.list.len().min(FORECAST_WINDOW_LEN);
    &forecast.list[..len]
}

/// Rules run in a fixed order: rain, heat, wind.
pub fn derive_alerts(window: &[OwForecastEntry], current: &OwCurrentResponse) -> AlertSet {
    let mut alerts = AlertSet::new();

    for entry in window {
        if is_rainy(entry) {
            alerts.insert(RAIN_ALERT);
        }
    }

    if current.main.temp > HEAT_THRESHOLD_C {
        alerts.insert(HEAT_ALERT);
    }

    if current.wind.speed * MPS_TO_KMH > WIND_THRESHOLD_KMH {
        alerts.insert(WIND_ALERT);
    }

    alerts
}

fn is_rainy(entry: &OwForecastEntry) -> bool {
    entry
        .weather
        .first()
        .is_some_and(|w| w.main.to_lowercase().contains("rain"))
}

fn describe(weather: Option<&OwWeather>) -> (String, &str) {
    match weather {
        Some(w) => (w.description.clone(), w.icon.as_str()),
        None => ("unknown".to_string(), "unknown"),
    }
}

fn calendar_day(dt_txt: &str) -> String {
    match NaiveDateTime::parse_from_str(dt_txt, "%Y-%m-%d %H:%M:%S") {
        Ok(dt) => dt.date().to_string(),
        Err(_) => dt_txt.split(' ').next().unwrap_or(dt_txt).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::openweather::tests::{current_json, forecast_json};

    const ICONS: &str = "https://openweathermap.org/img/wn";

    fn payloads(temp: f64, wind: f64, entries: &[(&str, &str)]) -> UpstreamPayloads {
        UpstreamPayloads {
            current: serde_json::from_value(current_json(temp, wind)).unwrap(),
            forecast: serde_json::from_value(forecast_json(entries)).unwrap(),
        }
    }

    fn five_day_feed(rain: Option<usize>) -> Vec<(String, &'static str)> {
        (0..40)
            .map(|i| {
                let day = 1 + i / 8;
                let hour = (i % 8) * 3;
                let main = if Some(i) == rain { "Rain" } else { "Clouds" };
                (format!("2024-06-{day:02} {hour:02}:00:00"), main)
            })
            .collect()
    }

    fn as_refs<'a>(feed: &'a [(String, &'static str)]) -> Vec<(&'a str, &'a str)> {
        feed.iter().map(|(t, m)| (t.as_str(), *m)).collect()
    }

    #[test]
    fn all_three_alerts_in_rule_order() {
        let feed = five_day_feed(Some(3));
        let weather = aggregate(&payloads(36.2, 15.0, &as_refs(&feed)), ICONS);

        let alerts = weather.alerts.into_vec();
        assert_eq!(alerts, vec![RAIN_ALERT, HEAT_ALERT, WIND_ALERT]);
    }

    #[test]
    fn calm_day_has_no_alerts_and_serializes_empty_array() {
        let feed = five_day_feed(None);
        let weather = aggregate(&payloads(20.0, 2.0, &as_refs(&feed)), ICONS);

        assert!(weather.alerts.is_empty());
        let json = serde_json::to_value(&weather).unwrap();
        assert_eq!(json["alerts"], serde_json::json!([]));
    }

    #[test]
    fn rain_in_many_entries_yields_one_alert() {
        let entries = [
            ("2024-06-01 00:00:00", "Rain"),
            ("2024-06-01 03:00:00", "rain"),
            ("2024-06-01 06:00:00", "Light RAIN"),
        ];
        let weather = aggregate(&payloads(20.0, 2.0, &entries), ICONS);

        assert_eq!(weather.alerts.into_vec(), vec![RAIN_ALERT]);
    }

    #[test]
    fn rain_outside_window_is_ignored() {
        let feed = five_day_feed(Some(FORECAST_WINDOW_LEN));
        let weather = aggregate(&payloads(20.0, 2.0, &as_refs(&feed)), ICONS);

        assert!(!weather.alerts.contains(RAIN_ALERT));
    }

    #[test]
    fn thresholds_are_strict() {
        let alerts = aggregate(&payloads(35.0, 13.8, &[]), ICONS).alerts;
        assert!(alerts.is_empty());

        let alerts = aggregate(&payloads(35.1, 13.9, &[]), ICONS).alerts;
        assert_eq!(alerts.into_vec(), vec![HEAT_ALERT, WIND_ALERT]);
    }

    #[test]
    fn wind_alone_still_comes_after_absent_rules() {
        let alerts = aggregate(&payloads(10.0, 20.0, &[]), ICONS).alerts;
        assert_eq!(alerts.into_vec(), vec![WIND_ALERT]);
    }

    #[test]
    fn daily_forecast_picks_noon_samples() {
        let feed = five_day_feed(None);
        let weather = aggregate(&payloads(20.0, 2.0, &as_refs(&feed)), ICONS);
        let forecast = weather.forecast;

        assert_eq!(forecast.len(), 5);
        assert!(forecast.iter().all(|e| e.timestamp.ends_with("12:00:00")));
        assert_eq!(forecast[0].timestamp, "2024-06-01 12:00:00");
        assert_eq!(forecast[0].icon_url, format!("{ICONS}/10d.png"));
        assert_eq!(forecast[0].condition_text, "clouds");
    }

    #[test]
    fn daily_forecast_keeps_one_entry_per_day() {
        let entries = [
            ("2024-06-01 12:00:00", "Clear"),
            ("2024-06-01 12:00:00", "Rain"),
            ("2024-06-02 12:00:00", "Clear"),
        ];
        let forecast = aggregate(&payloads(20.0, 2.0, &entries), ICONS).forecast;

        assert_eq!(forecast.len(), 2);
        assert_eq!(forecast[0].condition_text, "clear");
    }

    #[test]
    fn short_horizon_without_noon_yields_empty_forecast() {
        let entries = [
            ("2024-06-01 15:00:00", "Clear"),
            ("2024-06-01 18:00:00", "Clear"),
        ];
        let forecast = aggregate(&payloads(20.0, 2.0, &entries), ICONS).forecast;

        assert!(forecast.is_empty());
    }

    #[test]
    fn current_fields_are_extracted() {
        let current = aggregate(&payloads(21.0, 4.5, &[]), ICONS).current;

        assert_eq!(current.place_name, "Testville");
        assert_eq!(current.temperature_c, 21.0);
        assert_eq!(current.humidity_pct, 40);
        assert_eq!(current.wind_speed_mps, 4.5);
        assert_eq!(current.condition_text, "clear sky");
        assert_eq!(current.icon_url, format!("{ICONS}/01d@2x.png"));
        assert_eq!(
            current.coordinates,
            Coordinates {
                lat: 50.45,
                lon: 30.52,
            }
        );
    }

    #[test]
    fn aggregation_is_deterministic() {
        let feed = five_day_feed(Some(2));
        let input = payloads(36.0, 16.0, &as_refs(&feed));

        let first = serde_json::to_string(&aggregate(&input, ICONS)).unwrap();
        let second = serde_json::to_string(&aggregate(&input, ICONS)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn calendar_day_falls_back_to_date_prefix() {
        assert_eq!(calendar_day("2024-06-01 12:00:00"), "2024-06-01");
        assert_eq!(calendar_day("June-1 12:00:00"), "June-1");
    }
}
