//! `wxannounce` - Spoken current-weather announcements for a location token
//!
//! This library classifies a location token (postal code, ICAO station or
//! named outpost), resolves it, fetches current conditions, caches them and
//! prepares the payload consumed by the audio renderer.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod location;
pub mod logging;
pub mod models;
pub mod normalize;
pub mod output;
pub mod pipeline;
pub mod weather;

// Re-export core types for public API
pub use api::{AviationSource, ForecastSource, Geocoder, GriddedConditions};
pub use cache::WeatherCache;
pub use config::WxConfig;
pub use error::WxError;
pub use models::{
    AnnouncementPayload, Coordinates, Fahrenheit, LocationKind, TemperatureUnit,
    WeatherObservation,
};
pub use normalize::SoundAssets;
pub use output::PayloadWriter;
pub use pipeline::{Overrides, PipelineSettings, WeatherPipeline};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, WxError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
