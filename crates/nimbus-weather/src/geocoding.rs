//! Open-Meteo geocoding client (place name → coordinates).

use serde::Deserialize;
use tracing::debug;

use crate::WeatherError;

const GEOCODING_API_URL: &str = "https://geocoding-api.open-meteo.com/v1/search";

/// A resolved place: canonical name, country, and coordinates.
#[derive(Debug, Clone, Deserialize)]
pub struct GeoMatch {
    pub name: String,
    #[serde(default)]
    pub country: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    // Open-Meteo omits the field entirely when nothing matched.
    #[serde(default)]
    results: Vec<GeoMatch>,
}

/// Geocoding lookup client.
pub struct GeocodingClient {
    http: reqwest::Client,
}

impl GeocodingClient {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(8))
                .build()
                .expect("failed to build HTTP client"),
        }
    }

    /// Resolve a free-text place name to its best geographic match.
    pub async fn lookup(&self, name: &str) -> Result<GeoMatch, WeatherError> {
        debug!(place = %name, "Geocoding lookup");

        let response = self
            .http
            .get(GEOCODING_API_URL)
            .query(&[
                ("name", name),
                ("count", "1"),
                ("language", "en"),
                ("format", "json"),
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

        let search: SearchResponse = response
            .json()
            .await
            .map_err(|e| WeatherError::Parse(e.to_string()))?;

        search
            .results
            .into_iter()
            .next()
            .ok_or_else(|| WeatherError::PlaceNotFound(name.to_string()))
    }
}

impl Default for GeocodingClient {
    fn default() -> Self {
        Self::new()
    }
}
