//! Open-Meteo forecast client (coordinates → current temperature).

use chrono::NaiveDateTime;
use serde::Deserialize;
use tracing::debug;

use crate::{celsius_to_fahrenheit, WeatherError};

const FORECAST_API_URL: &str = "https://api.open-meteo.com/v1/forecast";

/// A current temperature reading at a coordinate.
#[derive(Debug, Clone)]
pub struct CurrentTemperature {
    pub latitude: f64,
    pub longitude: f64,
    pub celsius: f64,
    pub fahrenheit: f64,
    pub observed_at: Option<NaiveDateTime>,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    #[serde(default)]
    current: Option<CurrentBlock>,
}

#[derive(Debug, Deserialize)]
struct CurrentBlock {
    #[serde(default)]
    temperature_2m: Option<f64>,
    #[serde(default)]
    time: Option<String>,
}

/// Current-weather lookup client.
pub struct ForecastClient {
    http: reqwest::Client,
}

impl ForecastClient {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(8))
                .build()
                .expect("failed to build HTTP client"),
        }
    }

    /// Fetch the current temperature at the given coordinates.
    pub async fn current_temperature(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<CurrentTemperature, WeatherError> {
        debug!(latitude, longitude, "Forecast lookup");

        let response = self
            .http
            .get(FORECAST_API_URL)
            .query(&[
                ("latitude", latitude.to_string()),
                ("longitude", longitude.to_string()),
                ("current", "temperature_2m".to_string()),
            ])
            .send()
            .await
            .map_err(|e| WeatherError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let text = text.chars().take(200).collect::<String>();
            return Err(WeatherError::Network(format!("HTTP {status}: {text}")));
        }

        let forecast: ForecastResponse = response
            .json()
            .await
            .map_err(|e| WeatherError::Parse(e.to_string()))?;

        let current = forecast.current.ok_or(WeatherError::TemperatureUnavailable {
            latitude,
            longitude,
        })?;
        let celsius = current
            .temperature_2m
            .ok_or(WeatherError::TemperatureUnavailable {
                latitude,
                longitude,
            })?;

        Ok(CurrentTemperature {
            latitude,
            longitude,
            celsius,
            fahrenheit: celsius_to_fahrenheit(celsius),
            observed_at: current.time.as_deref().and_then(parse_observation_time),
        })
    }
}

impl Default for ForecastClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Open-Meteo reports times as minute-resolution ISO 8601 (`2026-08-07T12:15`).
fn parse_observation_time(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
        .ok()
}
