//! Weather source adapter
//!
//! Two independent strategies produce the same [`WeatherObservation`]:
//! raw aviation reports for ICAO stations and gridded current conditions for
//! everything that resolved to coordinates.

pub mod metar;
pub mod wmo;

use crate::api::{AviationSource, ForecastSource};
use crate::models::{Coordinates, Fahrenheit, SourceKind, WeatherObservation};
use crate::{Result, WxError};
use chrono_tz::Tz;
use tracing::{debug, info, warn};

/// Fetch and parse a station report, trying each provider in order.
///
/// A provider whose report cannot be fetched or carries no temperature is
/// skipped. Running out of providers is a resolution failure for the station.
pub fn observe_station(
    sources: &[Box<dyn AviationSource>],
    station: &str,
) -> Result<WeatherObservation> {
    for source in sources {
        let body = match source.fetch_report(station) {
            Ok(body) => body,
            Err(e) => {
                warn!("{}", e);
                continue;
            }
        };

        let Some(report) = metar::extract_report(&body, station) else {
            warn!("{} returned no report line for {}", source.name(), station);
            continue;
        };
        debug!("Raw report from {}: {}", source.name(), report);

        let summary = metar::parse(report);
        if let Some(reported) = summary
            .station
            .as_deref()
            .filter(|reported| !reported.eq_ignore_ascii_case(station))
        {
            warn!(
                "{} answered for {} instead of {}",
                source.name(),
                reported,
                station
            );
            continue;
        }
        let Some(celsius) = summary.temperature_celsius else {
            warn!(
                "Report from {} for {} has no temperature group",
                source.name(),
                station
            );
            continue;
        };

        let observation = WeatherObservation {
            temperature: Fahrenheit::from_celsius(f64::from(celsius)),
            condition: summary.condition.to_string(),
            timezone: None,
            source: SourceKind::AviationReport,
        };
        info!(
            "{} via {}: {}°C ({}), {}",
            station,
            source.name(),
            celsius,
            observation.temperature,
            observation.condition
        );
        return Ok(observation);
    }

    Err(WxError::resolution(
        station,
        "no usable observation report from any aviation provider",
    ))
}

/// Fetch gridded current conditions for resolved coordinates
pub fn observe_coordinates(
    source: &dyn ForecastSource,
    coordinates: Coordinates,
) -> Result<WeatherObservation> {
    let conditions = source.current_conditions(coordinates)?;
    let condition = wmo::weather_code_to_condition(conditions.weather_code);

    let timezone = conditions
        .timezone
        .filter(|name| match name.parse::<Tz>() {
            Ok(_) => true,
            Err(_) => {
                warn!("Ignoring unknown timezone name '{}'", name);
                false
            }
        });

    info!(
        "{}: {}, {} ({})",
        coordinates.format_coordinates(),
        conditions.temperature,
        condition,
        timezone.as_deref().unwrap_or("no timezone")
    );

    Ok(WeatherObservation {
        temperature: conditions.temperature,
        condition: condition.to_string(),
        timezone,
        source: SourceKind::GriddedForecast,
    })
}
