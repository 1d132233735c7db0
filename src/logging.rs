//! Tracing subscriber setup
//!
//! Logs go to stderr so stdout stays free for the announcement summary.

use crate::config::LoggingConfig;
use crate::{Result, WxError};
use tracing_subscriber::EnvFilter;

/// Filter directive for the run: `RUST_LOG` first, then `--verbose`, then config
fn filter(config: &LoggingConfig, verbose: bool) -> EnvFilter {
    let level = if verbose { "debug" } else { config.level.as_str() };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

/// Install the global subscriber
pub fn init(config: &LoggingConfig, verbose: bool) -> Result<()> {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter(config, verbose))
        .with_writer(std::io::stderr);

    let installed = if config.format == "json" {
        builder
            .json()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .try_init()
    } else {
        builder.with_target(false).try_init()
    };

    installed.map_err(|e| WxError::config(format!("Failed to initialise logging: {e}")))
}
