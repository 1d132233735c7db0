//! Raw METAR text providers

use super::{AviationSource, HttpClient};
use crate::{Result, WxError};
use tracing::instrument;

fn read_body(http: &HttpClient, source_name: &str, url: &str) -> Result<String> {
    let body = http
        .get(source_name, url)?
        .text()
        .map_err(|e| WxError::fetch(source_name, format!("unreadable body: {e}")))?;

    if body.trim().is_empty() {
        return Err(WxError::fetch(source_name, "empty report"));
    }
    Ok(body)
}

/// aviationweather.gov data API, `format=raw`
pub struct RawMetarApi {
    http: HttpClient,
    base_url: String,
}

impl RawMetarApi {
    #[must_use]
    pub fn new(http: HttpClient, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }
}

impl AviationSource for RawMetarApi {
    fn name(&self) -> &str {
        "aviationweather"
    }

    #[instrument(skip(self))]
    fn fetch_report(&self, station: &str) -> Result<String> {
        let url = format!(
            "{}?ids={}&format=raw",
            self.base_url,
            urlencoding::encode(station)
        );
        read_body(&self.http, self.name(), &url)
    }
}

/// NOAA per-station text files: a timestamp line followed by the report
pub struct NoaaStationFile {
    http: HttpClient,
    base_url: String,
}

impl NoaaStationFile {
    #[must_use]
    pub fn new(http: HttpClient, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

impl AviationSource for NoaaStationFile {
    fn name(&self) -> &str {
        "noaa-tgftp"
    }

    #[instrument(skip(self))]
    fn fetch_report(&self, station: &str) -> Result<String> {
        let url = format!("{}/{}.TXT", self.base_url, station.to_ascii_uppercase());
        read_body(&self.http, self.name(), &url)
    }
}
