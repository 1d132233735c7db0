//! Request pipeline: classify → cache → resolve → fetch → normalize
//!
//! Settings are fixed when the pipeline is built; anything that may vary per
//! request travels in [`Overrides`].

use crate::api::{
    AviationSource, ForecastSource, Geocoder, HttpClient, NoaaStationFile, NominatimGeocoder,
    OpenMeteoClient, RawMetarApi,
};
use crate::cache::WeatherCache;
use crate::config::WxConfig;
use crate::location::{CountryPreference, LocationResolver, ResolvedLocation, classify};
use crate::models::{
    AnnouncementPayload, LocationKind, PostalShape, TemperatureUnit, WeatherObservation,
};
use crate::normalize::{self, SoundAssets};
use crate::weather;
use crate::{Result, WxError};
use tracing::{debug, info, warn};

/// Per-request adjustments
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    /// Country for postal lookups instead of the configured default
    pub force_country: Option<String>,
    /// Display unit instead of the configured one
    pub force_unit: Option<TemperatureUnit>,
    /// Neither read nor write the cache
    pub bypass_cache: bool,
    /// Announce the temperature only
    pub skip_condition_processing: bool,
}

/// Pipeline-wide settings
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub default_country: String,
    pub unit: TemperatureUnit,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            default_country: "us".to_string(),
            unit: TemperatureUnit::default(),
        }
    }
}

/// Turns location tokens into weather observations and announcements
pub struct WeatherPipeline {
    geocoder: Box<dyn Geocoder>,
    forecast: Box<dyn ForecastSource>,
    /// Tried in order until one yields a usable report
    aviation: Vec<Box<dyn AviationSource>>,
    cache: WeatherCache,
    settings: PipelineSettings,
}

impl WeatherPipeline {
    #[must_use]
    pub fn new(
        geocoder: Box<dyn Geocoder>,
        forecast: Box<dyn ForecastSource>,
        aviation: Vec<Box<dyn AviationSource>>,
        cache: WeatherCache,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            geocoder,
            forecast,
            aviation,
            cache,
            settings,
        }
    }

    /// Build the pipeline with the HTTP providers described by `config`
    pub fn from_config(config: &WxConfig) -> Result<Self> {
        let http = HttpClient::new(&config.weather)?;
        let weather_config = &config.weather;

        let geocoder = NominatimGeocoder::new(
            http.clone(),
            weather_config.geocoding_url.as_str(),
            weather_config.geocode_min_interval(),
        );
        let forecast = OpenMeteoClient::new(http.clone(), weather_config.forecast_url.as_str());
        let aviation: Vec<Box<dyn AviationSource>> = vec![
            Box::new(RawMetarApi::new(
                http.clone(),
                weather_config.metar_primary_url.as_str(),
            )),
            Box::new(NoaaStationFile::new(
                http,
                weather_config.metar_secondary_url.as_str(),
            )),
        ];

        let cache = if config.cache.enabled {
            WeatherCache::open(config.cache.directory(), config.cache.ttl())
        } else {
            debug!("Cache disabled by configuration");
            WeatherCache::disabled()
        };

        let settings = PipelineSettings {
            default_country: config.location.default_country.clone(),
            unit: config.unit()?,
        };

        Ok(Self::new(
            Box::new(geocoder),
            Box::new(forecast),
            aviation,
            cache,
            settings,
        ))
    }

    #[must_use]
    pub fn cache(&self) -> &WeatherCache {
        &self.cache
    }

    /// Current weather for a location token.
    ///
    /// Only fully successful observations whose temperature passes the
    /// Fahrenheit sanity bound are cached.
    #[tracing::instrument(level = "debug", skip(self, overrides))]
    pub fn observe(&self, token: &str, overrides: &Overrides) -> Result<WeatherObservation> {
        let token = token.trim();
        if token.is_empty() {
            return Err(WxError::resolution(token, "empty location"));
        }

        let kind = classify(token);
        let countries = CountryPreference {
            default_country: &self.settings.default_country,
            forced_country: overrides.force_country.as_deref(),
        };
        if let LocationKind::PostalCode {
            shape: PostalShape::Ambiguous5Digit,
            ..
        } = &kind
        {
            let notice = WxError::ClassificationAmbiguous {
                token: token.to_string(),
                assumed_country: countries.for_ambiguous().to_string(),
            };
            info!("{}", notice);
        }

        if overrides.bypass_cache {
            debug!("Cache bypassed for this request");
        } else if let Some(observation) = self.cache.get(token) {
            info!("Serving {} from cache", token);
            return Ok(observation);
        }

        let resolver = LocationResolver::new(self.geocoder.as_ref());
        let observation = match resolver.resolve(&kind, countries)? {
            ResolvedLocation::Station(station) => {
                weather::observe_station(&self.aviation, &station)?
            }
            ResolvedLocation::Coordinates(coordinates) => {
                weather::observe_coordinates(self.forecast.as_ref(), coordinates)?
            }
        };

        match normalize::display_temperature(observation.temperature, TemperatureUnit::Fahrenheit)
        {
            Ok(_) if !overrides.bypass_cache => self.cache.set(token, &observation),
            Ok(_) => {}
            Err(e) => warn!("{}; observation for {} not cached", e, token),
        }

        Ok(observation)
    }

    /// Observe and turn the result into a renderer payload
    pub fn announce(
        &self,
        token: &str,
        overrides: &Overrides,
        assets: &SoundAssets,
    ) -> Result<AnnouncementPayload> {
        let observation = self.observe(token, overrides)?;
        Ok(self.payload_for(&observation, overrides, assets))
    }

    /// Renderer payload for an observation already in hand
    #[must_use]
    pub fn payload_for(
        &self,
        observation: &WeatherObservation,
        overrides: &Overrides,
        assets: &SoundAssets,
    ) -> AnnouncementPayload {
        let unit = overrides.force_unit.unwrap_or(self.settings.unit);
        normalize::announcement(
            observation,
            unit,
            assets,
            overrides.skip_condition_processing,
        )
    }
}
