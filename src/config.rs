//! Configuration management for `wxannounce`
//!
//! Handles loading configuration from files and environment variables,
//! and provides validation for all configuration settings.

use crate::models::TemperatureUnit;
use crate::{Result, WxError};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WxConfig {
    /// Location classification defaults
    #[serde(default)]
    pub location: LocationConfig,
    /// Provider endpoints and HTTP settings
    #[serde(default)]
    pub weather: WeatherConfig,
    /// Observation cache settings
    #[serde(default)]
    pub cache: CacheConfig,
    /// Announcement output settings
    #[serde(default)]
    pub output: OutputConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Location classification settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationConfig {
    /// Country assumed for bare 5-digit postal codes
    #[serde(default = "default_country")]
    pub default_country: String,
}

/// Provider endpoints and HTTP settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// Request timeout in seconds
    #[serde(default = "default_weather_timeout")]
    pub timeout_seconds: u32,
    /// User-Agent sent with every request; Nominatim rejects anonymous clients
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_geocoding_url")]
    pub geocoding_url: String,
    #[serde(default = "default_forecast_url")]
    pub forecast_url: String,
    #[serde(default = "default_metar_primary_url")]
    pub metar_primary_url: String,
    #[serde(default = "default_metar_secondary_url")]
    pub metar_secondary_url: String,
    /// Minimum spacing between geocoding requests in milliseconds
    #[serde(default = "default_geocode_min_interval")]
    pub geocode_min_interval_ms: u64,
}

/// Cache configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_cache_enabled")]
    pub enabled: bool,
    /// Observation TTL in seconds
    #[serde(default = "default_cache_ttl")]
    pub ttl_seconds: u64,
    /// Cache directory location
    #[serde(default = "default_cache_location")]
    pub location: String,
    /// Minimum time between expired-entry sweeps in seconds
    #[serde(default = "default_purge_interval")]
    pub purge_interval_seconds: u64,
}

/// Announcement output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Display unit, `F` or `C`
    #[serde(default = "default_unit")]
    pub unit: String,
    /// Directory of condition sound assets
    #[serde(default = "default_sounds_dir")]
    pub sounds_dir: String,
    /// Directory the payload files are written to; nothing is written when unset
    #[serde(default)]
    pub directory: Option<String>,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_country() -> String {
    "us".to_string()
}

fn default_weather_timeout() -> u32 {
    10
}

fn default_user_agent() -> String {
    format!("wxannounce/{}", env!("CARGO_PKG_VERSION"))
}

fn default_geocoding_url() -> String {
    "https://nominatim.openstreetmap.org".to_string()
}

fn default_forecast_url() -> String {
    "https://api.open-meteo.com/v1".to_string()
}

fn default_metar_primary_url() -> String {
    "https://aviationweather.gov/api/data/metar".to_string()
}

fn default_metar_secondary_url() -> String {
    "https://tgftp.nws.noaa.gov/data/observations/metar/stations".to_string()
}

fn default_geocode_min_interval() -> u64 {
    1000
}

fn default_cache_enabled() -> bool {
    true
}

fn default_cache_ttl() -> u64 {
    1800
}

fn default_cache_location() -> String {
    "~/.cache/wxannounce".to_string()
}

fn default_purge_interval() -> u64 {
    3600
}

fn default_unit() -> String {
    "F".to_string()
}

fn default_sounds_dir() -> String {
    "~/.local/share/wxannounce/sounds".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            default_country: default_country(),
        }
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_weather_timeout(),
            user_agent: default_user_agent(),
            geocoding_url: default_geocoding_url(),
            forecast_url: default_forecast_url(),
            metar_primary_url: default_metar_primary_url(),
            metar_secondary_url: default_metar_secondary_url(),
            geocode_min_interval_ms: default_geocode_min_interval(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: default_cache_enabled(),
            ttl_seconds: default_cache_ttl(),
            location: default_cache_location(),
            purge_interval_seconds: default_purge_interval(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            unit: default_unit(),
            sounds_dir: default_sounds_dir(),
            directory: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl WeatherConfig {
    #[must_use]
    pub fn geocode_min_interval(&self) -> Duration {
        Duration::from_millis(self.geocode_min_interval_ms)
    }
}

impl CacheConfig {
    #[must_use]
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }

    #[must_use]
    pub fn purge_interval(&self) -> Duration {
        Duration::from_secs(self.purge_interval_seconds)
    }

    #[must_use]
    pub fn directory(&self) -> PathBuf {
        expand_tilde(&self.location)
    }
}

impl OutputConfig {
    #[must_use]
    pub fn sounds_dir(&self) -> PathBuf {
        expand_tilde(&self.sounds_dir)
    }

    #[must_use]
    pub fn directory(&self) -> Option<PathBuf> {
        self.directory.as_deref().map(expand_tilde)
    }
}

impl WxConfig {
    /// Load configuration from the default file location and environment
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from the specified path.
    ///
    /// An explicitly given file must exist; the default file is optional.
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = match config_path {
            Some(path) if !path.exists() => {
                return Err(WxError::config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            Some(path) => Some(path),
            None => Self::get_config_path().filter(|path| path.exists()),
        };

        if let Some(path) = config_file {
            builder = builder.add_source(
                File::from(path)
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // Environment overrides, e.g. WXANNOUNCE__CACHE__TTL_SECONDS=600
        builder = builder.add_source(
            Environment::with_prefix("WXANNOUNCE")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .map_err(|e| WxError::config(format!("Failed to build configuration: {e}")))?;

        let mut config: WxConfig = settings
            .try_deserialize()
            .map_err(|e| WxError::config(format!("Failed to deserialize configuration: {e}")))?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("wxannounce").join("config.toml"))
    }

    /// Apply default values to empty configuration fields
    pub fn apply_defaults(&mut self) {
        if self.location.default_country.trim().is_empty() {
            self.location.default_country = default_country();
        }
        self.location.default_country = self.location.default_country.trim().to_lowercase();

        if self.weather.timeout_seconds == 0 {
            self.weather.timeout_seconds = default_weather_timeout();
        }
        if self.weather.user_agent.is_empty() {
            self.weather.user_agent = default_user_agent();
        }
        if self.weather.geocoding_url.is_empty() {
            self.weather.geocoding_url = default_geocoding_url();
        }
        if self.weather.forecast_url.is_empty() {
            self.weather.forecast_url = default_forecast_url();
        }
        if self.weather.metar_primary_url.is_empty() {
            self.weather.metar_primary_url = default_metar_primary_url();
        }
        if self.weather.metar_secondary_url.is_empty() {
            self.weather.metar_secondary_url = default_metar_secondary_url();
        }
        if self.cache.ttl_seconds == 0 {
            self.cache.ttl_seconds = default_cache_ttl();
        }
        if self.cache.location.is_empty() {
            self.cache.location = default_cache_location();
        }
        if self.cache.purge_interval_seconds == 0 {
            self.cache.purge_interval_seconds = default_purge_interval();
        }
        if self.output.unit.is_empty() {
            self.output.unit = default_unit();
        }
        if self.output.sounds_dir.is_empty() {
            self.output.sounds_dir = default_sounds_dir();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Display unit from `output.unit`
    pub fn unit(&self) -> Result<TemperatureUnit> {
        self.output.unit.parse()
    }

    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.weather.timeout_seconds > 120 {
            return Err(WxError::config(
                "Weather request timeout cannot exceed 120 seconds",
            ));
        }

        if self.weather.geocode_min_interval_ms > 60_000 {
            return Err(WxError::config(
                "Geocode request interval cannot exceed 60000 ms",
            ));
        }

        if self.cache.ttl_seconds > 86_400 {
            return Err(WxError::config(
                "Cache TTL cannot exceed 86400 seconds (1 day)",
            ));
        }

        if self.cache.purge_interval_seconds > 604_800 {
            return Err(WxError::config(
                "Cache purge interval cannot exceed 604800 seconds (1 week)",
            ));
        }

        Ok(())
    }

    fn validate_string_values(&self) -> Result<()> {
        validate_country(&self.location.default_country)?;
        self.unit()?;

        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(WxError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            )));
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(WxError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            )));
        }

        for (name, url) in [
            ("geocoding_url", &self.weather.geocoding_url),
            ("forecast_url", &self.weather.forecast_url),
            ("metar_primary_url", &self.weather.metar_primary_url),
            ("metar_secondary_url", &self.weather.metar_secondary_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(WxError::config(format!(
                    "weather.{name} must be a valid HTTP or HTTPS URL"
                )));
            }
        }

        Ok(())
    }
}

/// Check a 2-letter country code and return it lower-cased
pub fn validate_country(country: &str) -> Result<String> {
    let country = country.trim();
    if country.len() == 2 && country.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(country.to_ascii_lowercase())
    } else {
        Err(WxError::config(format!(
            "Invalid country '{country}'. Expected a 2-letter code such as 'us' or 'ca'"
        )))
    }
}

/// Expand a leading `~` to the home directory
#[must_use]
pub fn expand_tilde(path: &str) -> PathBuf {
    match path.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => dirs::home_dir()
            .map_or_else(
                || PathBuf::from(path),
                |home| home.join(rest.trim_start_matches('/')),
            ),
        _ => Path::new(path).to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::env;
    use std::fs;

    #[test]
    fn test_default_config() {
        let config = WxConfig::default();
        assert_eq!(config.location.default_country, "us");
        assert_eq!(config.weather.timeout_seconds, 10);
        assert_eq!(config.cache.ttl_seconds, 1800);
        assert!(config.cache.enabled);
        assert_eq!(config.output.unit, "F");
        assert!(config.output.directory.is_none());
        assert_eq!(config.logging.level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_invalid_log_level() {
        let mut config = WxConfig::default();
        config.logging.level = "invalid".to_string();
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid log level"));
    }

    #[test]
    fn test_config_validation_numeric_ranges() {
        let mut config = WxConfig::default();
        config.weather.timeout_seconds = 500;
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("timeout cannot exceed"));
    }

    #[test]
    fn test_config_validation_rejects_bad_url() {
        let mut config = WxConfig::default();
        config.weather.forecast_url = "ftp://example.com".to_string();
        assert!(matches!(config.validate(), Err(WxError::Config { .. })));
    }

    #[rstest]
    #[case("us", true)]
    #[case(" CA ", true)]
    #[case("usa", false)]
    #[case("u1", false)]
    #[case("", false)]
    fn test_validate_country(#[case] input: &str, #[case] valid: bool) {
        assert_eq!(validate_country(input).is_ok(), valid);
    }

    #[test]
    fn test_invalid_unit_rejected() {
        let mut config = WxConfig::default();
        config.output.unit = "K".to_string();
        assert!(config.validate().is_err());
        config.output.unit = "c".to_string();
        assert_eq!(config.unit().unwrap(), TemperatureUnit::Celsius);
    }

    #[test]
    fn test_apply_defaults_fills_empty_values() {
        let mut config = WxConfig::default();
        config.location.default_country = " GB ".to_string();
        config.cache.ttl_seconds = 0;
        config.logging.format = String::new();
        config.apply_defaults();
        assert_eq!(config.location.default_country, "gb");
        assert_eq!(config.cache.ttl_seconds, 1800);
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_load_from_file_with_partial_sections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "[location]\ndefault_country = \"CA\"\n\n[output]\nunit = \"C\"\ndirectory = \"/tmp/wx\"\n",
        )
        .unwrap();

        let config = WxConfig::load_from_path(Some(path)).unwrap();
        assert_eq!(config.location.default_country, "ca");
        assert_eq!(config.unit().unwrap(), TemperatureUnit::Celsius);
        assert_eq!(config.output.directory(), Some(PathBuf::from("/tmp/wx")));
        assert_eq!(config.weather.timeout_seconds, 10);
    }

    #[test]
    fn test_load_missing_explicit_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = WxConfig::load_from_path(Some(dir.path().join("absent.toml")));
        assert!(matches!(result, Err(WxError::Config { .. })));
    }

    #[test]
    fn test_environment_variable_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[weather]\ngeocode_min_interval_ms = 1000\n").unwrap();

        // SAFETY: Test environment, no other test reads this key
        unsafe {
            env::set_var("WXANNOUNCE__WEATHER__GEOCODE_MIN_INTERVAL_MS", "2500");
        }

        let result = WxConfig::load_from_path(Some(path));

        // SAFETY: Test cleanup
        unsafe {
            env::remove_var("WXANNOUNCE__WEATHER__GEOCODE_MIN_INTERVAL_MS");
        }

        let config = result.unwrap();
        assert_eq!(config.weather.geocode_min_interval(), Duration::from_millis(2500));
    }

    #[test]
    fn test_config_path_generation() {
        let path = WxConfig::get_config_path();
        assert!(path.is_some());
        let path = path.unwrap();
        assert!(path.to_string_lossy().contains("wxannounce"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    #[test]
    fn test_expand_tilde() {
        assert_eq!(expand_tilde("/var/cache/wx"), PathBuf::from("/var/cache/wx"));
        assert_eq!(expand_tilde("~user/x"), PathBuf::from("~user/x"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_tilde("~/.cache/wx"), home.join(".cache/wx"));
        }
    }
}
