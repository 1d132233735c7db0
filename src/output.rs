//! Payload files for the audio renderer
//!
//! The renderer reads three small text files from one directory. Each is
//! replaced atomically; a value that is absent removes its file so the
//! renderer never speaks stale data.

use crate::models::AnnouncementPayload;
use crate::Result;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

pub const TEMPERATURE_FILE: &str = "temperature";
pub const CONDITION_FILE: &str = "condition";
pub const TIMEZONE_FILE: &str = "timezone";

/// Writes [`AnnouncementPayload`] values into an output directory
#[derive(Debug, Clone)]
pub struct PayloadWriter {
    dir: PathBuf,
}

impl PayloadWriter {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Replace the payload files with `payload`
    pub fn write(&self, payload: &AnnouncementPayload) -> Result<()> {
        fs::create_dir_all(&self.dir)?;

        let temperature = payload
            .temperature_display
            .map(|value| format!("{value}\n{}\n", payload.unit));
        self.replace(TEMPERATURE_FILE, temperature.as_deref())?;

        let condition = (!payload.condition_asset_ids.is_empty())
            .then(|| payload.condition_asset_ids.join("\n") + "\n");
        self.replace(CONDITION_FILE, condition.as_deref())?;

        let timezone = payload.timezone.as_ref().map(|tz| format!("{tz}\n"));
        self.replace(TIMEZONE_FILE, timezone.as_deref())?;

        debug!("Wrote announcement payload to {}", self.dir.display());
        Ok(())
    }

    /// Remove every payload file; all removals are attempted and the first
    /// error is returned
    pub fn clear(&self) -> Result<()> {
        [TEMPERATURE_FILE, CONDITION_FILE, TIMEZONE_FILE]
            .into_iter()
            .map(|name| self.replace(name, None))
            .fold(Ok(()), |first, removed| first.and(removed))
    }

    fn replace(&self, name: &str, contents: Option<&str>) -> Result<()> {
        let path = self.dir.join(name);
        match contents {
            Some(contents) => {
                let mut file = NamedTempFile::new_in(&self.dir)?;
                file.write_all(contents.as_bytes())?;
                file.persist(&path).map_err(|e| e.error)?;
            }
            None => match fs::remove_file(&path) {
                Err(e) if e.kind() != ErrorKind::NotFound => return Err(e.into()),
                _ => {}
            },
        }
        Ok(())
    }
}
