//! wxannounce - command-line entry point
//!
//! Resolves one location token, prints a one-line summary (or JSON) and
//! writes the renderer payload files when an output directory is set.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::warn;

use wxannounce::config::validate_country;
use wxannounce::{
    AnnouncementPayload, Overrides, PayloadWriter, SoundAssets, TemperatureUnit, WeatherPipeline,
    WxConfig, WxError, logging,
};

/// Command-line arguments for wxannounce
#[derive(Parser, Debug)]
#[command(name = "wxannounce")]
#[command(about = "Announce the current weather for a postal code, ICAO station or outpost")]
#[command(version)]
struct Args {
    /// ZIP/postal code, 4-letter ICAO station code or outpost name
    location: String,

    /// Configuration file (defaults to <config dir>/wxannounce/config.toml)
    #[arg(short, long, env = "WXANNOUNCE_CONFIG")]
    config: Option<PathBuf>,

    /// 2-letter country for postal lookups
    #[arg(long)]
    country: Option<String>,

    /// Display unit: F or C
    #[arg(short, long)]
    unit: Option<String>,

    /// Neither read nor write the observation cache
    #[arg(long)]
    no_cache: bool,

    /// Announce the temperature only
    #[arg(long)]
    no_condition: bool,

    /// Directory of condition sound assets
    #[arg(long)]
    sounds: Option<PathBuf>,

    /// Directory to write the payload files into
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Print the observation and payload as JSON
    #[arg(long)]
    json: bool,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let (message, code) = match e.downcast_ref::<WxError>() {
                Some(err) => (err.user_message(), err.exit_code()),
                None => (format!("{e:#}"), 1),
            };
            eprintln!("wxannounce: {message}");
            ExitCode::from(code)
        }
    }
}

fn run(args: &Args) -> Result<()> {
    let config = WxConfig::load_from_path(args.config.clone())?;
    logging::init(&config.logging, args.verbose)?;

    let overrides = Overrides {
        force_country: args.country.as_deref().map(validate_country).transpose()?,
        force_unit: args
            .unit
            .as_deref()
            .map(str::parse::<TemperatureUnit>)
            .transpose()?,
        bypass_cache: args.no_cache,
        skip_condition_processing: args.no_condition,
    };

    let pipeline =
        WeatherPipeline::from_config(&config).context("Failed to set up weather providers")?;

    pipeline
        .cache()
        .purge_if_due(config.cache.purge_interval());

    let writer = args
        .output_dir
        .clone()
        .or_else(|| config.output.directory())
        .map(PayloadWriter::new);

    let observation = match pipeline.observe(&args.location, &overrides) {
        Ok(observation) => observation,
        Err(e) => {
            if let Some(Err(clear_err)) = writer.as_ref().map(PayloadWriter::clear) {
                warn!("Could not remove stale payload files: {}", clear_err);
            }
            return Err(e.into());
        }
    };

    let assets = if args.no_condition {
        SoundAssets::default()
    } else {
        let dir = args
            .sounds
            .clone()
            .unwrap_or_else(|| config.output.sounds_dir());
        SoundAssets::from_dir(&dir)
    };
    let payload = pipeline.payload_for(&observation, &overrides, &assets);

    if let Some(writer) = &writer {
        write_or_clear(writer, &payload)?;
    }

    if args.json {
        let report = serde_json::json!({
            "location": args.location.trim(),
            "observation": observation,
            "announcement": payload,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", payload.summary(&observation.condition));
    }

    Ok(())
}

/// Write the payload; on failure remove whatever was already replaced
fn write_or_clear(writer: &PayloadWriter, payload: &AnnouncementPayload) -> Result<()> {
    writer.write(payload).or_else(|e| {
        if let Err(clear_err) = writer.clear() {
            warn!("Could not remove partial payload files: {}", clear_err);
        }
        Err(e).with_context(|| {
            format!("Failed to write payload files to {}", writer.dir().display())
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_flags() {
        let args = Args::try_parse_from([
            "wxannounce",
            "--country",
            "CA",
            "-u",
            "c",
            "--no-cache",
            "--json",
            "K7L 3N6",
        ])
        .unwrap();
        assert_eq!(args.location, "K7L 3N6");
        assert_eq!(args.country.as_deref(), Some("CA"));
        assert_eq!(args.unit.as_deref(), Some("c"));
        assert!(args.no_cache);
        assert!(args.json);
        assert!(!args.no_condition);
    }

    #[test]
    fn test_failed_write_leaves_no_partial_payload() {
        let dir = tempfile::tempdir().unwrap();
        let writer = PayloadWriter::new(dir.path());
        let payload = AnnouncementPayload {
            temperature_display: Some(72),
            unit: TemperatureUnit::Fahrenheit,
            condition_asset_ids: vec!["rain".to_string()],
            timezone: Some("America/Chicago".to_string()),
        };
        write_or_clear(&writer, &payload).unwrap();

        // A directory squatting on the condition file makes the second write fail
        std::fs::remove_file(dir.path().join("condition")).unwrap();
        std::fs::create_dir(dir.path().join("condition")).unwrap();
        let updated = AnnouncementPayload {
            temperature_display: Some(40),
            ..payload
        };

        assert!(write_or_clear(&writer, &updated).is_err());
        assert!(!dir.path().join("temperature").exists());
        assert!(!dir.path().join("timezone").exists());
    }

    #[test]
    fn test_location_is_required() {
        assert!(Args::try_parse_from(["wxannounce"]).is_err());
    }
}
