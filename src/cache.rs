//! Directory-backed observation cache with TTL expiry
//!
//! One file per location token. Writes go to a temp file in the same
//! directory and are renamed into place, so concurrent invocations sharing the
//! directory only ever see whole entries and the last writer wins.

use crate::models::WeatherObservation;
use crate::{Result, WxError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

const ENTRY_EXTENSION: &str = "entry";
const PURGE_MARKER: &str = ".last-purge";

#[derive(Serialize, Deserialize)]
struct StoredEntry {
    key: String,
    value: WeatherObservation,
    #[serde(with = "chrono::serde::ts_seconds")]
    stored_at: DateTime<Utc>,
    ttl_secs: u64,
}

impl StoredEntry {
    /// A TTL too large to represent never expires
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        i64::try_from(self.ttl_secs)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .and_then(|ttl| self.stored_at.checked_add_signed(ttl))
            .is_none_or(|expires_at| now < expires_at)
    }
}

/// TTL cache of weather observations keyed by the raw location token
#[derive(Debug, Clone)]
pub struct WeatherCache {
    /// `None` when caching is disabled or the store is unusable
    dir: Option<PathBuf>,
    ttl: Duration,
    bypass: bool,
}

impl WeatherCache {
    /// Open (creating if needed) a cache directory.
    ///
    /// An unusable directory degrades to a disabled cache instead of failing.
    pub fn open(dir: impl AsRef<Path>, ttl: Duration) -> Self {
        let dir = dir.as_ref();
        match fs::create_dir_all(dir) {
            Ok(()) => {
                debug!("Using cache directory {}", dir.display());
                Self {
                    dir: Some(dir.to_path_buf()),
                    ttl,
                    bypass: false,
                }
            }
            Err(e) => {
                let err = WxError::cache(format!("{}: {e}", dir.display()));
                warn!("{}; continuing without cache", err);
                Self::disabled()
            }
        }
    }

    /// A cache that stores nothing
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            dir: None,
            ttl: Duration::ZERO,
            bypass: false,
        }
    }

    /// With bypass on, `get` always misses and `set` does nothing
    #[must_use]
    pub fn with_bypass(mut self, bypass: bool) -> Self {
        self.bypass = bypass;
        self
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.dir.is_some() && !self.bypass
    }

    /// Fresh observation for `key`, if any
    #[tracing::instrument(name = "query_cache", level = "debug", skip(self))]
    pub fn get(&self, key: &str) -> Option<WeatherObservation> {
        let path = self.entry_path(key)?;

        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Key not found");
                return None;
            }
            Err(e) => {
                warn!("Cache read failed for {}: {}", path.display(), e);
                return None;
            }
        };

        let entry: StoredEntry = match postcard::from_bytes(&bytes) {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Discarding unreadable cache entry {}: {}", path.display(), e);
                return None;
            }
        };

        if entry.key != key {
            debug!("Key collision with '{}', treating as miss", entry.key);
            None
        } else if entry.is_fresh(Utc::now()) {
            debug!("Key found and still fresh");
            Some(entry.value)
        } else {
            debug!("Key found but expired");
            None
        }
    }

    /// Store an observation, overwriting any previous entry for `key`
    pub fn set(&self, key: &str, observation: &WeatherObservation) {
        if let Err(e) = self.try_set(key, observation) {
            warn!("{}; observation not cached", e);
        }
    }

    #[tracing::instrument(name = "put_cache", level = "debug", skip(self, observation))]
    fn try_set(&self, key: &str, observation: &WeatherObservation) -> Result<()> {
        let (Some(dir), Some(path)) = (self.dir.as_deref(), self.entry_path(key)) else {
            return Ok(());
        };

        let entry = StoredEntry {
            key: key.to_string(),
            value: observation.clone(),
            stored_at: Utc::now(),
            ttl_secs: self.ttl.as_secs(),
        };
        let bytes = postcard::to_stdvec(&entry)
            .map_err(|e| WxError::cache(format!("encode failed: {e}")))?;

        let mut file = NamedTempFile::new_in(dir)?;
        file.write_all(&bytes)?;
        file.persist(&path)
            .map_err(|e| WxError::cache(format!("{}: {}", path.display(), e.error)))?;
        debug!("Stored {} bytes at {}", bytes.len(), path.display());
        Ok(())
    }

    /// Delete expired and unreadable entries; returns how many were removed
    pub fn purge_expired(&self) -> Result<usize> {
        let Some(dir) = self.dir.as_deref() else {
            return Ok(0);
        };

        let now = Utc::now();
        let mut removed = 0;
        for dir_entry in fs::read_dir(dir)? {
            let path = dir_entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(ENTRY_EXTENSION) {
                continue;
            }

            let stale = match fs::read(&path) {
                Ok(bytes) => postcard::from_bytes::<StoredEntry>(&bytes)
                    .map_or(true, |entry| !entry.is_fresh(now)),
                // Raced with another purge
                Err(e) if e.kind() == ErrorKind::NotFound => false,
                Err(e) => return Err(e.into()),
            };

            if stale {
                match fs::remove_file(&path) {
                    Ok(()) => removed += 1,
                    Err(e) if e.kind() == ErrorKind::NotFound => {}
                    Err(e) => return Err(e.into()),
                }
            }
        }

        Ok(removed)
    }

    /// Run [`purge_expired`](Self::purge_expired) if the last sweep is older
    /// than `interval`. Failures are logged, never returned.
    pub fn purge_if_due(&self, interval: Duration) -> usize {
        let Some(dir) = self.dir.as_deref() else {
            return 0;
        };
        let marker = dir.join(PURGE_MARKER);

        let due = fs::metadata(&marker)
            .and_then(|m| m.modified())
            .map_or(true, |modified| {
                SystemTime::now()
                    .duration_since(modified)
                    .map_or(true, |elapsed| elapsed >= interval)
            });
        if !due {
            return 0;
        }

        if let Err(e) = fs::write(&marker, b"") {
            warn!("Could not update purge marker {}: {}", marker.display(), e);
        }
        match self.purge_expired() {
            Ok(removed) => {
                if removed > 0 {
                    info!("Purged {} expired cache entries", removed);
                }
                removed
            }
            Err(e) => {
                warn!("Cache purge failed: {}", e);
                0
            }
        }
    }

    fn entry_path(&self, key: &str) -> Option<PathBuf> {
        if self.bypass {
            return None;
        }
        self.dir.as_ref().map(|dir| dir.join(key_file_name(key)))
    }
}

/// File name for a key: ASCII alphanumerics kept, everything else `_xx` hex
#[must_use]
pub fn key_file_name(key: &str) -> String {
    let mut name = String::with_capacity(key.len() + ENTRY_EXTENSION.len() + 1);
    for byte in key.bytes() {
        if byte.is_ascii_alphanumeric() {
            name.push(char::from(byte));
        } else {
            name.push_str(&format!("_{byte:02x}"));
        }
    }
    name.push('.');
    name.push_str(ENTRY_EXTENSION);
    name
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Fahrenheit, SourceKind};
    use rstest::rstest;

    fn observation(temperature: f64) -> WeatherObservation {
        WeatherObservation {
            temperature: Fahrenheit::new(temperature),
            condition: "Partly Cloudy".to_string(),
            timezone: Some("America/Chicago".to_string()),
            source: SourceKind::GriddedForecast,
        }
    }

    #[test]
    fn test_round_trip_within_ttl() {
        let dir = tempfile::tempdir().unwrap();
        let cache = WeatherCache::open(dir.path(), Duration::from_secs(1800));
        assert!(cache.get("60601").is_none());

        cache.set("60601", &observation(71.6));
        assert_eq!(cache.get("60601"), Some(observation(71.6)));
    }

    #[test]
    fn test_overwrite_last_write_wins() {
        let dir = tempfile::tempdir().unwrap();
        let cache = WeatherCache::open(dir.path(), Duration::from_secs(1800));
        cache.set("60601", &observation(71.6));
        cache.set("60601", &observation(50.0));
        assert_eq!(cache.get("60601"), Some(observation(50.0)));
    }

    #[test]
    fn test_zero_ttl_is_expired() {
        let dir = tempfile::tempdir().unwrap();
        let cache = WeatherCache::open(dir.path(), Duration::ZERO);
        cache.set("KJFK", &observation(41.0));
        assert!(cache.get("KJFK").is_none());
        assert_eq!(cache.purge_expired().unwrap(), 1);
        assert!(fs::read_dir(dir.path()).unwrap().next().is_none());
    }

    #[rstest]
    #[case(u64::MAX)]
    #[case(u64::try_from(i64::MAX).unwrap())]
    #[case(9_300_000_000_000_000)]
    fn test_huge_ttl_never_expires(#[case] ttl_secs: u64) {
        let dir = tempfile::tempdir().unwrap();
        let cache = WeatherCache::open(dir.path(), Duration::from_secs(ttl_secs));
        cache.set("60601", &observation(71.6));
        assert_eq!(cache.get("60601"), Some(observation(71.6)));
        assert_eq!(cache.purge_expired().unwrap(), 0);
        assert_eq!(cache.purge_if_due(Duration::ZERO), 0);
    }

    #[test]
    fn test_bypass_never_reads_or_writes() {
        let dir = tempfile::tempdir().unwrap();
        let cache = WeatherCache::open(dir.path(), Duration::from_secs(1800));
        cache.set("60601", &observation(71.6));

        let bypassed = cache.clone().with_bypass(true);
        assert!(!bypassed.is_active());
        assert!(bypassed.get("60601").is_none());
        bypassed.set("60601", &observation(10.0));
        assert_eq!(cache.get("60601"), Some(observation(71.6)));
    }

    #[test]
    fn test_unusable_directory_degrades() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        fs::write(&blocker, b"x").unwrap();

        let cache = WeatherCache::open(blocker.join("cache"), Duration::from_secs(60));
        assert!(!cache.is_active());
        cache.set("60601", &observation(71.6));
        assert!(cache.get("60601").is_none());
    }

    #[test]
    fn test_corrupt_entry_is_a_miss_and_purged() {
        let dir = tempfile::tempdir().unwrap();
        let cache = WeatherCache::open(dir.path(), Duration::from_secs(1800));
        fs::write(dir.path().join(key_file_name("60601")), b"\xff\xff\xff").unwrap();
        cache.set("KJFK", &observation(41.0));

        assert!(cache.get("60601").is_none());
        assert_eq!(cache.purge_expired().unwrap(), 1);
        assert!(cache.get("KJFK").is_some());
    }

    #[test]
    fn test_purge_if_due_respects_marker() {
        let dir = tempfile::tempdir().unwrap();
        let cache = WeatherCache::open(dir.path(), Duration::ZERO);
        cache.set("a", &observation(1.0));
        assert_eq!(cache.purge_if_due(Duration::from_secs(3600)), 1);

        cache.set("b", &observation(2.0));
        // Marker was just written, so the next sweep is not due yet
        assert_eq!(cache.purge_if_due(Duration::from_secs(3600)), 0);
        assert_eq!(cache.purge_if_due(Duration::ZERO), 1);
    }

    #[test]
    fn test_key_file_name() {
        assert_eq!(key_file_name("KJFK"), "KJFK.entry");
        assert_eq!(key_file_name("K1A 0B1"), "K1A_200B1.entry");
        assert_eq!(key_file_name("../x"), "_2e_2e_2fx.entry");
        assert_ne!(key_file_name("kjfk"), key_file_name("KJFK"));
    }
}
