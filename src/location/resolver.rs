//! Location Resolution Module
//!
//! Turns a classified token into either coordinates (for the gridded source)
//! or a station code (for the aviation source). Postal codes go through an
//! ordered list of geocoding attempts that stops at the first hit.

use super::canada;
use crate::api::Geocoder;
use crate::models::{Coordinates, LocationKind, PostalShape};
use crate::{Result, WxError};
use tracing::{debug, info, warn};

/// Where the weather for a token comes from
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedLocation {
    Coordinates(Coordinates),
    Station(String),
}

/// One geocoding query in a fallback chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeocodeAttempt {
    PostalCode {
        code: String,
        country: Option<String>,
    },
    /// Free-text proxy place, e.g. a city standing in for a postal region
    Place(String),
}

impl GeocodeAttempt {
    fn run(&self, geocoder: &dyn Geocoder) -> Result<Option<Coordinates>> {
        match self {
            GeocodeAttempt::PostalCode { code, country } => {
                geocoder.search_postal_code(code, country.as_deref())
            }
            GeocodeAttempt::Place(place) => geocoder.search_place(place),
        }
    }
}

/// Country selection for postal lookups, fixed for the whole request
#[derive(Debug, Clone, Copy)]
pub struct CountryPreference<'a> {
    /// Configured default for ambiguous 5-digit codes
    pub default_country: &'a str,
    /// Per-request override
    pub forced_country: Option<&'a str>,
}

impl CountryPreference<'_> {
    #[must_use]
    pub fn for_ambiguous(&self) -> &str {
        self.forced_country.unwrap_or(self.default_country)
    }
}

/// Service for resolving classified location tokens
pub struct LocationResolver<'a> {
    geocoder: &'a dyn Geocoder,
}

impl<'a> LocationResolver<'a> {
    #[must_use]
    pub fn new(geocoder: &'a dyn Geocoder) -> Self {
        Self { geocoder }
    }

    /// Resolve a classified token
    pub fn resolve(
        &self,
        kind: &LocationKind,
        countries: CountryPreference<'_>,
    ) -> Result<ResolvedLocation> {
        debug!("Resolving {}: {:?}", kind.label(), kind);

        match kind {
            LocationKind::NamedOutpost { name, coordinates } => {
                debug!("Outpost {} at {}", name, coordinates.format_coordinates());
                Ok(ResolvedLocation::Coordinates(*coordinates))
            }
            LocationKind::IcaoCode(station) => Ok(ResolvedLocation::Station(station.clone())),
            LocationKind::PostalCode { code, .. } => {
                let attempts = postal_attempts(kind, countries);
                self.first_hit(code, &attempts)
                    .map(ResolvedLocation::Coordinates)
            }
        }
    }

    fn first_hit(&self, token: &str, attempts: &[GeocodeAttempt]) -> Result<Coordinates> {
        for (index, attempt) in attempts.iter().enumerate() {
            debug!("Geocoding attempt {}/{}: {:?}", index + 1, attempts.len(), attempt);
            match attempt.run(self.geocoder) {
                Ok(Some(coordinates)) => {
                    info!(
                        "Resolved {} to {} via {:?}",
                        token,
                        coordinates.format_coordinates(),
                        attempt
                    );
                    return Ok(coordinates);
                }
                Ok(None) => debug!("No match for {:?}", attempt),
                Err(e) => warn!("{}; trying next fallback", e),
            }
        }

        Err(WxError::resolution(token, "could not resolve location"))
    }
}

/// Geocoding attempts for a postal-style token, in priority order
#[must_use]
pub fn postal_attempts(kind: &LocationKind, countries: CountryPreference<'_>) -> Vec<GeocodeAttempt> {
    let LocationKind::PostalCode { code, shape, .. } = kind else {
        return Vec::new();
    };
    if code.is_empty() {
        return Vec::new();
    }

    match shape {
        PostalShape::Ambiguous5Digit => vec![
            GeocodeAttempt::PostalCode {
                code: code.clone(),
                country: Some(countries.for_ambiguous().to_string()),
            },
            GeocodeAttempt::PostalCode {
                code: code.clone(),
                country: None,
            },
        ],
        PostalShape::Canada => {
            let mut attempts = vec![GeocodeAttempt::PostalCode {
                code: code.clone(),
                country: Some("ca".to_string()),
            }];
            attempts.extend(
                canada::proxy_cities(code)
                    .into_iter()
                    .map(|city| GeocodeAttempt::Place(format!("{city}, Canada"))),
            );
            attempts
        }
        PostalShape::International => vec![GeocodeAttempt::PostalCode {
            code: code.clone(),
            country: countries.forced_country.map(str::to_string),
        }],
    }
}
