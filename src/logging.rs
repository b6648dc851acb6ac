//! Tracing subscriber setup.

use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::Logging;
use crate::error::{Error, Result};

/// Build the filter: `RUST_LOG` wins, then the configured level.
pub fn filter(config: &Logging) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| configured(&config.level))
}

/// Filter for a configured level, falling back to `info` when malformed.
fn configured(level: &str) -> EnvFilter {
    EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init(config: &Logging) -> Result<()> {
    let registry = tracing_subscriber::registry().with(filter(config));
    let result = if config.json {
        registry.with(fmt::layer().json()).try_init()
    } else {
        registry.with(fmt::layer()).try_init()
    };
    result.map_err(|e| Error::Config(format!("Failed to install logger: {e}")))
}
