//! Weather lookups for Nimbus.
//!
//! Resolves free-text place names to current temperature readings via the
//! Open-Meteo public APIs: geocoding search (name → coordinates), then the
//! forecast endpoint (coordinates → current temperature). Exposes the
//! lookup to AI sessions as the `get_weather_by_city` tool.

pub mod forecast;
pub mod geocoding;
pub mod tool;

pub use forecast::{CurrentTemperature, ForecastClient};
pub use geocoding::{GeoMatch, GeocodingClient};
pub use tool::WeatherTool;

#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("no match for place name: {0}")]
    PlaceNotFound(String),

    #[error("temperature unavailable at {latitude},{longitude}")]
    TemperatureUnavailable { latitude: f64, longitude: f64 },

    #[error("network error: {0}")]
    Network(String),

    #[error("parse error: {0}")]
    Parse(String),
}

/// Convert Celsius to Fahrenheit, rounded to one decimal place.
pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    ((celsius * 9.0 / 5.0 + 32.0) * 10.0).round() / 10.0
}
