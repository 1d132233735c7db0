//! Announcement payload handed to the external renderer

use crate::WxError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Display unit for the announced temperature
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum TemperatureUnit {
    #[default]
    #[serde(rename = "F")]
    Fahrenheit,
    #[serde(rename = "C")]
    Celsius,
}

impl TemperatureUnit {
    #[must_use]
    pub fn symbol(self) -> char {
        match self {
            TemperatureUnit::Fahrenheit => 'F',
            TemperatureUnit::Celsius => 'C',
        }
    }
}

impl fmt::Display for TemperatureUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl FromStr for TemperatureUnit {
    type Err = WxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "f" | "fahrenheit" => Ok(TemperatureUnit::Fahrenheit),
            "c" | "celsius" => Ok(TemperatureUnit::Celsius),
            other => Err(WxError::config(format!(
                "Invalid temperature unit '{other}'. Must be one of: F, C"
            ))),
        }
    }
}

/// What the renderer needs to speak the current weather
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AnnouncementPayload {
    /// Rounded display temperature; `None` when the value failed the sanity check
    pub temperature_display: Option<i32>,
    pub unit: TemperatureUnit,
    /// Sound asset ids in speaking order; empty means temperature-only
    pub condition_asset_ids: Vec<String>,
    pub timezone: Option<String>,
}

impl AnnouncementPayload {
    /// One-line human summary, e.g. "72°F, partly cloudy (America/Chicago)"
    #[must_use]
    pub fn summary(&self, condition: &str) -> String {
        let temperature = self
            .temperature_display
            .map_or_else(|| "--".to_string(), |t| format!("{t}°{}", self.unit));
        match &self.timezone {
            Some(tz) => format!("{temperature}, {condition} ({tz})"),
            None => format!("{temperature}, {condition}"),
        }
    }
}
