//! Weather observation model shared by both weather sources and the cache

use serde::{Deserialize, Serialize};
use std::fmt;

/// Temperature tagged as degrees Fahrenheit.
///
/// Every source stores its reading in this unit. Only the normalizer turns it
/// into a display value, so a cached observation is never converted twice.
/// The raw value is not reachable from outside the crate:
///
/// ```compile_fail
/// let degrees = wxannounce::Fahrenheit::new(41.0).degrees();
/// ```
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
#[serde(transparent)]
pub struct Fahrenheit(f64);

impl Fahrenheit {
    #[must_use]
    pub fn new(degrees: f64) -> Self {
        Self(degrees)
    }

    /// Acquisition-time conversion for sources that report Celsius
    #[must_use]
    pub fn from_celsius(celsius: f64) -> Self {
        Self(celsius * 9.0 / 5.0 + 32.0)
    }

    /// Raw value in degrees Fahrenheit
    #[must_use]
    pub(crate) fn degrees(self) -> f64 {
        self.0
    }
}

impl fmt::Display for Fahrenheit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}°F", self.0)
    }
}

/// Which source produced an observation
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    GriddedForecast,
    AviationReport,
}

/// Current conditions for one location token
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct WeatherObservation {
    pub temperature: Fahrenheit,
    /// Free-text condition, e.g. "Partly Cloudy"
    pub condition: String,
    /// IANA timezone name; only the gridded source supplies one
    pub timezone: Option<String>,
    pub source: SourceKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_celsius() {
        assert_eq!(Fahrenheit::from_celsius(5.0).degrees(), 41.0);
        assert_eq!(Fahrenheit::from_celsius(-40.0).degrees(), -40.0);
        assert_eq!(Fahrenheit::from_celsius(100.0).degrees(), 212.0);
    }

    #[test]
    fn test_display() {
        assert_eq!(Fahrenheit::new(72.34).to_string(), "72.3°F");
    }
}
