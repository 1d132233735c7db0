//! Location model: classified tokens and geographic coordinates

use serde::{Deserialize, Serialize};

/// Location coordinates
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Coordinates {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
}

impl Coordinates {
    /// Create new coordinates
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Whether both components lie inside the valid WGS84 ranges
    #[must_use]
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }

    /// Format location as coordinates string
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// Regional shape of a postal-style token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostalShape {
    /// Five digits: US ZIP, German PLZ, French code postal, ...
    Ambiguous5Digit,
    /// `A9A 9A9`
    Canada,
    /// Anything else
    International,
}

/// Result of classifying a raw location token
#[derive(Debug, Clone, PartialEq)]
pub enum LocationKind {
    /// Fixed remote location from the static outpost table
    NamedOutpost {
        name: &'static str,
        coordinates: Coordinates,
    },
    /// Four-letter aviation station identifier (upper-cased)
    IcaoCode(String),
    /// Postal or ZIP code
    PostalCode {
        /// Code as it will be sent to the geocoder
        code: String,
        shape: PostalShape,
        /// 2-letter country hint (lower-case), if the shape implies one
        country: Option<String>,
    },
}

impl LocationKind {
    /// Short label for logs
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            LocationKind::NamedOutpost { .. } => "named outpost",
            LocationKind::IcaoCode(_) => "ICAO station",
            LocationKind::PostalCode {
                shape: PostalShape::Ambiguous5Digit,
                ..
            } => "5-digit postal code",
            LocationKind::PostalCode {
                shape: PostalShape::Canada,
                ..
            } => "Canadian postal code",
            LocationKind::PostalCode { .. } => "international postal code",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinates_validity() {
        assert!(Coordinates::new(46.8182, 8.2275).is_valid());
        assert!(Coordinates::new(-90.0, 0.0).is_valid());
        assert!(!Coordinates::new(91.0, 0.0).is_valid());
        assert!(!Coordinates::new(0.0, -180.5).is_valid());
    }

    #[test]
    fn test_format_coordinates() {
        let coords = Coordinates::new(-77.846_32, 166.676_2);
        assert_eq!(coords.format_coordinates(), "-77.8463, 166.6762");
    }
}
