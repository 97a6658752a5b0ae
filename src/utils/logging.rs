//! # Logging Setup
//!
//! Structured logging configuration for hosts embedding the pipeline.
//!
//! Decoders themselves only emit `tracing` events; this module wires a
//! subscriber for binaries that have not installed their own.

use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;
use crate::error::{DecodeError, Result};

/// Install a global subscriber according to `config`.
///
/// Returns `ConfigError` when the level or filter directive cannot be parsed
/// or a global subscriber is already set.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let filter = match &config.filter {
        Some(directives) => EnvFilter::try_new(directives)
            .map_err(|e| DecodeError::ConfigError(format!("invalid log filter: {e}")))?,
        None => {
            let level: Level = config
                .level
                .parse()
                .map_err(|_| DecodeError::ConfigError(format!("invalid log level: {}", config.level)))?;
            EnvFilter::new(level.as_str())
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| DecodeError::ConfigError(format!("failed to install subscriber: {e}")))
}
