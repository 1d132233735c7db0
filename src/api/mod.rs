//! HTTP plumbing and provider seams
//!
//! Each external collaborator sits behind a small trait so the pipeline can be
//! driven by fakes in tests. The HTTP implementations share one blocking
//! client with a short timeout and no automatic retries: the pipeline's
//! fallback chain decides what to try next.

pub mod aviation;
pub mod nominatim;
pub mod open_meteo;

use crate::config::WeatherConfig;
use crate::models::{Coordinates, Fahrenheit};
use crate::{Result, WxError};
use reqwest::blocking::{Client, Response};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

pub use aviation::{NoaaStationFile, RawMetarApi};
pub use nominatim::NominatimGeocoder;
pub use open_meteo::OpenMeteoClient;

/// Forward geocoding by postal code or free-text place name
pub trait Geocoder {
    /// Best candidate for a postal code, optionally restricted to a 2-letter country
    fn search_postal_code(&self, postal_code: &str, country: Option<&str>)
    -> Result<Option<Coordinates>>;

    /// Best candidate for a free-text place name
    fn search_place(&self, query: &str) -> Result<Option<Coordinates>>;
}

/// Current conditions from the gridded forecast provider
#[derive(Debug, Clone, PartialEq)]
pub struct GriddedConditions {
    pub temperature: Fahrenheit,
    /// WMO weather interpretation code
    pub weather_code: u8,
    pub timezone: Option<String>,
}

/// Gridded current-conditions provider keyed by coordinates
pub trait ForecastSource {
    /// Always acquires the temperature in Fahrenheit
    fn current_conditions(&self, coordinates: Coordinates) -> Result<GriddedConditions>;
}

/// Raw aviation observation report provider keyed by station code
pub trait AviationSource {
    /// Provider name for logs
    fn name(&self) -> &str;

    /// Response body as text; an empty body is a failure
    fn fetch_report(&self, station: &str) -> Result<String>;
}

/// Request limiter: at most `max_requests` per `window`
#[derive(Debug)]
pub struct RateLimiter {
    max_requests: usize,
    window: Duration,
    /// Request timestamps within the current window
    request_times: Vec<Instant>,
}

impl RateLimiter {
    /// Create a new rate limiter
    #[must_use]
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests: max_requests.max(1),
            window,
            request_times: Vec::new(),
        }
    }

    /// One request per `interval`
    #[must_use]
    pub fn per_interval(interval: Duration) -> Self {
        Self::new(1, interval)
    }

    /// Check if a request is allowed and record it
    pub fn allow_request(&mut self) -> bool {
        self.cleanup_old_requests();

        if self.request_times.len() >= self.max_requests {
            false
        } else {
            self.request_times.push(Instant::now());
            true
        }
    }

    /// Get time until next request is allowed
    pub fn time_until_next_request(&mut self) -> Duration {
        self.cleanup_old_requests();

        if self.request_times.len() < self.max_requests {
            return Duration::ZERO;
        }
        self.request_times
            .first()
            .map_or(Duration::ZERO, |oldest| {
                self.window.saturating_sub(oldest.elapsed())
            })
    }

    /// Block until a request is allowed, then record it
    pub fn acquire(&mut self) {
        while !self.allow_request() {
            let wait_time = self.time_until_next_request();
            debug!("Rate limit reached, waiting {:.3}s", wait_time.as_secs_f64());
            thread::sleep(wait_time);
        }
    }

    fn cleanup_old_requests(&mut self) {
        let window = self.window;
        self.request_times.retain(|time| time.elapsed() < window);
    }
}

/// Blocking HTTP client shared by the provider implementations
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Create a new HTTP client from the weather configuration
    pub fn new(config: &WeatherConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.into()))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| WxError::config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client })
    }

    /// GET `url`, mapping transport errors and non-success statuses to
    /// [`WxError::SourceFetchFailed`] tagged with `source_name`
    pub fn get(&self, source_name: &str, url: &str) -> Result<Response> {
        let start = Instant::now();
        debug!(source = source_name, url, "HTTP GET");

        let response = self.client.get(url).send().map_err(|e| {
            warn!(source = source_name, "Network error: {}", e);
            WxError::fetch(source_name, format!("network error: {e}"))
        })?;

        let status = response.status();
        debug!(
            source = source_name,
            "HTTP response {} in {:.3}s",
            status,
            start.elapsed().as_secs_f64()
        );

        if status.is_success() {
            Ok(response)
        } else {
            Err(WxError::fetch(
                source_name,
                format!(
                    "HTTP {} - {}",
                    status.as_u16(),
                    status.canonical_reason().unwrap_or("Unknown error")
                ),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limiter() {
        let mut limiter = RateLimiter::new(2, Duration::from_secs(60));

        // Should allow first 2 requests
        assert!(limiter.allow_request());
        assert!(limiter.allow_request());

        // Should deny 3rd request
        assert!(!limiter.allow_request());

        let wait_time = limiter.time_until_next_request();
        assert!(wait_time > Duration::ZERO);
        assert!(wait_time <= Duration::from_secs(60));
    }

    #[test]
    fn test_rate_limiter_acquire_spaces_requests() {
        let mut limiter = RateLimiter::per_interval(Duration::from_millis(50));
        let start = Instant::now();
        limiter.acquire();
        limiter.acquire();
        assert!(start.elapsed() >= Duration::from_millis(50));
    }

    #[test]
    fn test_zero_interval_never_blocks() {
        let mut limiter = RateLimiter::per_interval(Duration::ZERO);
        for _ in 0..5 {
            assert!(limiter.allow_request());
        }
    }
}
