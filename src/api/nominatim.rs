//! Forward geocoding via Nominatim (OpenStreetMap)
//!
//! Nominatim's usage policy allows one request per second, so every call goes
//! through a [`RateLimiter`].

use super::{Geocoder, HttpClient, RateLimiter};
use crate::models::Coordinates;
use crate::{Result, WxError};
use serde::Deserialize;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

const SOURCE_NAME: &str = "nominatim";

/// One search candidate. Nominatim returns coordinates as strings.
#[derive(Debug, Deserialize)]
struct SearchResult {
    lat: String,
    lon: String,
    #[serde(default)]
    display_name: Option<String>,
}

impl SearchResult {
    fn coordinates(&self) -> Option<Coordinates> {
        let coordinates = Coordinates::new(self.lat.parse().ok()?, self.lon.parse().ok()?);
        coordinates.is_valid().then_some(coordinates)
    }
}

pub struct NominatimGeocoder {
    http: HttpClient,
    base_url: String,
    rate_limiter: Mutex<RateLimiter>,
}

impl NominatimGeocoder {
    #[must_use]
    pub fn new(http: HttpClient, base_url: impl Into<String>, min_interval: Duration) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            rate_limiter: Mutex::new(RateLimiter::per_interval(min_interval)),
        }
    }

    fn search(&self, query: &str) -> Result<Option<Coordinates>> {
        let url = format!("{}/search?{query}&format=json&limit=1", self.base_url);

        self.rate_limiter
            .lock()
            .map_err(|_| WxError::fetch(SOURCE_NAME, "rate limiter poisoned"))?
            .acquire();

        let start = Instant::now();
        let results: Vec<SearchResult> = self
            .http
            .get(SOURCE_NAME, &url)?
            .json()
            .map_err(|e| WxError::fetch(SOURCE_NAME, format!("invalid response: {e}")))?;

        let Some(best) = results.first() else {
            debug!("No geocoding results in {:.3}s", start.elapsed().as_secs_f64());
            return Ok(None);
        };

        match best.coordinates() {
            Some(coordinates) => {
                info!(
                    "Geocoded to {} ({}) in {:.3}s",
                    coordinates.format_coordinates(),
                    best.display_name.as_deref().unwrap_or("unnamed"),
                    start.elapsed().as_secs_f64()
                );
                Ok(Some(coordinates))
            }
            None => {
                warn!("Discarding geocoding result with bad coordinates: {:?}", best);
                Ok(None)
            }
        }
    }
}

impl Geocoder for NominatimGeocoder {
    #[instrument(skip(self))]
    fn search_postal_code(
        &self,
        postal_code: &str,
        country: Option<&str>,
    ) -> Result<Option<Coordinates>> {
        let mut query = format!("postalcode={}", urlencoding::encode(postal_code));
        if let Some(country) = country {
            query.push_str(&format!("&countrycodes={}", urlencoding::encode(country)));
        }
        self.search(&query)
    }

    #[instrument(skip(self))]
    fn search_place(&self, place: &str) -> Result<Option<Coordinates>> {
        self.search(&format!("q={}", urlencoding::encode(place)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_search_results() {
        let body = r#"[{"place_id":1,"lat":"40.7484","lon":"-73.9857","display_name":"10001, New York"}]"#;
        let results: Vec<SearchResult> = serde_json::from_str(body).unwrap();
        let coordinates = results[0].coordinates().unwrap();
        assert_eq!(coordinates, Coordinates::new(40.7484, -73.9857));
    }

    #[test]
    fn test_empty_results() {
        let results: Vec<SearchResult> = serde_json::from_str("[]").unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_bad_coordinates_are_rejected() {
        let result = SearchResult {
            lat: "north".to_string(),
            lon: "0".to_string(),
            display_name: None,
        };
        assert!(result.coordinates().is_none());

        let result = SearchResult {
            lat: "95.0".to_string(),
            lon: "0".to_string(),
            display_name: None,
        };
        assert!(result.coordinates().is_none());
    }
}
