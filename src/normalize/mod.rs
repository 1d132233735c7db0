//! Display-boundary normalization
//!
//! This is the only place a [`Fahrenheit`] reading becomes a display value.

pub mod condition;

use crate::models::{
    AnnouncementPayload, Fahrenheit, TemperatureUnit, WeatherObservation,
};
use crate::{Result, WxError};
use tracing::warn;

pub use condition::{MatchStrategy, SoundAssets, condition_assets};

const FAHRENHEIT_BOUNDS: (i32, i32) = (-100, 150);
const CELSIUS_BOUNDS: (i32, i32) = (-60, 60);

fn bounds(unit: TemperatureUnit) -> (i32, i32) {
    match unit {
        TemperatureUnit::Fahrenheit => FAHRENHEIT_BOUNDS,
        TemperatureUnit::Celsius => CELSIUS_BOUNDS,
    }
}

/// Convert once, round to the nearest degree and range-check
pub fn display_temperature(temperature: Fahrenheit, unit: TemperatureUnit) -> Result<i32> {
    let value = match unit {
        TemperatureUnit::Fahrenheit => temperature.degrees(),
        TemperatureUnit::Celsius => (temperature.degrees() - 32.0) * 5.0 / 9.0,
    }
    .round();

    let (min, max) = bounds(unit);
    if value.is_finite() && (f64::from(min)..=f64::from(max)).contains(&value) {
        Ok(value as i32)
    } else {
        Err(WxError::NormalizationOutOfRange {
            value: if value.is_finite() { value as i64 } else { i64::MAX },
            unit: unit.symbol(),
            min,
            max,
        })
    }
}

/// Build the renderer payload.
///
/// An out-of-range temperature is logged and left out; the rest of the
/// payload is still produced. With `skip_condition` the asset list is empty.
#[must_use]
pub fn announcement(
    observation: &WeatherObservation,
    unit: TemperatureUnit,
    assets: &SoundAssets,
    skip_condition: bool,
) -> AnnouncementPayload {
    let temperature_display = match display_temperature(observation.temperature, unit) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("{}; announcing without temperature", e);
            None
        }
    };

    let condition_asset_ids = if skip_condition {
        Vec::new()
    } else {
        condition_assets(&observation.condition, assets)
    };

    AnnouncementPayload {
        temperature_display,
        unit,
        condition_asset_ids,
        timezone: observation.timezone.clone(),
    }
}
