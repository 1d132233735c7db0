//! Gridded current conditions from the Open-Meteo forecast API

use super::{ForecastSource, GriddedConditions, HttpClient};
use crate::models::{Coordinates, Fahrenheit};
use crate::{Result, WxError};
use serde::Deserialize;
use std::time::Instant;
use tracing::{info, instrument, warn};

const SOURCE_NAME: &str = "open-meteo";

/// Current weather response from `OpenMeteo` API
#[derive(Debug, Deserialize)]
struct ForecastResponse {
    #[serde(default)]
    timezone: Option<String>,
    current: Option<CurrentData>,
}

#[derive(Debug, Deserialize)]
struct CurrentData {
    #[serde(rename = "temperature_2m")]
    temperature: Option<f64>,
    weather_code: Option<u8>,
}

pub struct OpenMeteoClient {
    http: HttpClient,
    base_url: String,
}

impl OpenMeteoClient {
    #[must_use]
    pub fn new(http: HttpClient, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// The unit is pinned to Fahrenheit here and nowhere else.
    fn forecast_url(&self, coordinates: Coordinates) -> String {
        format!(
            "{}/forecast?latitude={:.4}&longitude={:.4}&current=temperature_2m,weather_code&temperature_unit=fahrenheit&timezone=auto",
            self.base_url, coordinates.latitude, coordinates.longitude
        )
    }
}

fn into_conditions(response: ForecastResponse) -> Result<GriddedConditions> {
    let current = response
        .current
        .ok_or_else(|| WxError::fetch(SOURCE_NAME, "no current weather in response"))?;
    let temperature = current
        .temperature
        .ok_or_else(|| WxError::fetch(SOURCE_NAME, "no temperature in response"))?;
    let weather_code = current.weather_code.unwrap_or_else(|| {
        warn!("Response has no weather code");
        u8::MAX
    });

    Ok(GriddedConditions {
        temperature: Fahrenheit::new(temperature),
        weather_code,
        timezone: response.timezone.filter(|tz| !tz.is_empty()),
    })
}

impl ForecastSource for OpenMeteoClient {
    #[instrument(skip(self), fields(lat = coordinates.latitude, lon = coordinates.longitude))]
    fn current_conditions(&self, coordinates: Coordinates) -> Result<GriddedConditions> {
        let start = Instant::now();
        let url = self.forecast_url(coordinates);

        let response: ForecastResponse = self
            .http
            .get(SOURCE_NAME, &url)?
            .json()
            .map_err(|e| WxError::fetch(SOURCE_NAME, format!("invalid response: {e}")))?;

        let conditions = into_conditions(response)?;
        info!(
            "Retrieved current conditions {} code {} in {:.3}s",
            conditions.temperature,
            conditions.weather_code,
            start.elapsed().as_secs_f64()
        );
        Ok(conditions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_current_conditions() {
        let body = r#"{
            "latitude": 40.75,
            "longitude": -73.99,
            "timezone": "America/New_York",
            "timezone_abbreviation": "EST",
            "current_units": {"temperature_2m": "°F"},
            "current": {"time": "2024-01-15T12:00", "interval": 900, "temperature_2m": 38.4, "weather_code": 3}
        }"#;
        let response: ForecastResponse = serde_json::from_str(body).unwrap();
        let conditions = into_conditions(response).unwrap();
        assert_eq!(conditions.temperature, Fahrenheit::new(38.4));
        assert_eq!(conditions.weather_code, 3);
        assert_eq!(conditions.timezone.as_deref(), Some("America/New_York"));
    }

    #[test]
    fn test_missing_current_block() {
        let response: ForecastResponse =
            serde_json::from_str(r#"{"timezone": "GMT"}"#).unwrap();
        assert!(matches!(
            into_conditions(response),
            Err(WxError::SourceFetchFailed { .. })
        ));
    }

    #[test]
    fn test_missing_weather_code_maps_to_unknown() {
        let response: ForecastResponse =
            serde_json::from_str(r#"{"current": {"temperature_2m": 12.0}}"#).unwrap();
        let conditions = into_conditions(response).unwrap();
        assert_eq!(conditions.weather_code, u8::MAX);
        assert!(conditions.timezone.is_none());
    }

    #[test]
    fn test_url_requests_fahrenheit() {
        let config = crate::config::WeatherConfig::default();
        let client = OpenMeteoClient::new(
            HttpClient::new(&config).unwrap(),
            "https://api.open-meteo.com/v1/",
        );
        let url = client.forecast_url(Coordinates::new(45.0, -93.25));
        assert!(url.starts_with("https://api.open-meteo.com/v1/forecast?"));
        assert!(url.contains("temperature_unit=fahrenheit"));
        assert!(url.contains("timezone=auto"));
        assert!(url.contains("latitude=45.0000&longitude=-93.2500"));
    }
}
