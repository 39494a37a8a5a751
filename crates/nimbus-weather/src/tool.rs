//! The `get_weather_by_city` tool exposed to AI sessions.

use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use nimbus_ai::tools::Tool;
use nimbus_ai::ToolDefinition;

use crate::{ForecastClient, GeocodingClient, WeatherError};

pub const WEATHER_TOOL_NAME: &str = "get_weather_by_city";

/// Tool that resolves a city name to its current temperature.
///
/// Lookup and transport failures come back as an in-band `error` field in
/// the payload so the model can report them conversationally instead of
/// the round failing.
pub struct WeatherTool {
    geocoding: GeocodingClient,
    forecast: ForecastClient,
}

impl WeatherTool {
    pub fn new() -> Self {
        Self {
            geocoding: GeocodingClient::new(),
            forecast: ForecastClient::new(),
        }
    }

    async fn lookup(&self, city: &str) -> Result<serde_json::Value, WeatherError> {
        let place = self.geocoding.lookup(city).await?;
        let reading = self
            .forecast
            .current_temperature(place.latitude, place.longitude)
            .await?;

        Ok(json!({
            "city": city,
            "resolved_name": place.name,
            "country": place.country,
            "latitude": place.latitude,
            "longitude": place.longitude,
            "temperature_c": reading.celsius,
            "temperature_f": reading.fahrenheit,
            "timestamp": reading
                .observed_at
                .map(|t| t.format("%Y-%m-%dT%H:%M").to_string()),
        }))
    }

    fn error_payload(city: &str, error: &WeatherError) -> serde_json::Value {
        json!({ "city": city, "error": error.to_string() })
    }
}

impl Default for WeatherTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for WeatherTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: WEATHER_TOOL_NAME.to_string(),
            description: "Get the current temperature (F) for a given city name. \
                          Provide city, optionally with state/country for disambiguation \
                          (e.g. 'Paris, France')."
                .to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "city": {
                        "type": "string",
                        "description": "City name, optionally with region/country."
                    }
                },
                "required": ["city"],
                "additionalProperties": false
            }),
        }
    }

    async fn invoke(&self, arguments: &serde_json::Value) -> serde_json::Value {
        let Some(city) = arguments["city"]
            .as_str()
            .map(str::trim)
            .filter(|c| !c.is_empty())
        else {
            return json!({ "error": "missing required 'city' argument" });
        };

        debug!(city, "Weather lookup");
        match self.lookup(city).await {
            Ok(payload) => payload,
            Err(e) => Self::error_payload(city, &e),
        }
    }
}
