//! # Configuration Management
//!
//! Centralized configuration for the packet decoding pipeline.
//!
//! This module provides structured configuration for the standard decoder
//! set: Ethernet FCS handling, IPv6 extension-header limits and logging.
//!
//! ## Configuration Sources
//! - TOML files via `from_file()`
//! - Direct instantiation with defaults
//! - Environment-specific overrides via `from_env()`

use crate::error::{DecodeError, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::protocol::ipv6::DEFAULT_MAX_EXTENSION_HEADERS;

/// Main configuration structure for the decoding pipeline.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct DecodeConfig {
    /// Ethernet decoder configuration
    #[serde(default)]
    pub ethernet: EthernetConfig,

    /// IPv6 decoder configuration
    #[serde(default)]
    pub ipv6: Ipv6Config,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl DecodeConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(path)
            .map_err(|e| DecodeError::ConfigError(format!("failed to open config file: {e}")))?;

        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .map_err(|e| DecodeError::ConfigError(format!("failed to read config file: {e}")))?;

        Self::from_toml(&contents)
    }

    /// Load configuration from a TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str::<Self>(content)
            .map_err(|e| DecodeError::ConfigError(format!("failed to parse TOML: {e}")))
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(trim) = std::env::var("PACKET_DECODE_TRIM_FCS") {
            if let Ok(val) = trim.parse::<bool>() {
                config.ethernet.trim_fcs = val;
            }
        }

        if let Ok(max) = std::env::var("PACKET_DECODE_MAX_EXTENSION_HEADERS") {
            if let Ok(val) = max.parse::<usize>() {
                config.ipv6.max_extension_headers = val;
            }
        }

        if let Ok(level) = std::env::var("PACKET_DECODE_LOG_LEVEL") {
            config.logging.level = level;
        }

        Ok(config)
    }

    /// Apply overrides to the default configuration
    pub fn default_with_overrides<F>(mutator: F) -> Self
    where
        F: FnOnce(&mut Self),
    {
        let mut config = Self::default();
        mutator(&mut config);
        config
    }

    /// Generate example configuration file content
    pub fn example_config() -> String {
        toml::to_string_pretty(&Self::default())
            .unwrap_or_else(|_| String::from("# failed to generate example config"))
    }

    /// Validate the configuration for common misconfigurations.
    ///
    /// Returns a list of validation errors. Empty list means the
    /// configuration is valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.ipv6.max_extension_headers == 0 {
            errors.push(
                "ipv6.max_extension_headers must be at least 1, or no extension header can ever \
                 be decoded"
                    .to_string(),
            );
        }
        if self.ipv6.max_extension_headers > 256 {
            errors.push(format!(
                "ipv6.max_extension_headers is {}; values above 256 exceed anything a real \
                 packet can carry",
                self.ipv6.max_extension_headers
            ));
        }

        let level = self.logging.level.to_ascii_lowercase();
        if !["trace", "debug", "info", "warn", "error"].contains(&level.as_str()) {
            errors.push(format!("logging.level '{}' is not a valid level", self.logging.level));
        }

        errors
    }
}

/// Ethernet decoder settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EthernetConfig {
    /// Treat the last 4 bytes of each frame as the FCS: decode it into the
    /// layer's `crc` field and exclude it from the payload. Leave off when
    /// the capture path already strips checksums (the common case).
    #[serde(default)]
    pub trim_fcs: bool,
}

impl Default for EthernetConfig {
    fn default() -> Self {
        Self { trim_fcs: false }
    }
}

/// IPv6 decoder settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Ipv6Config {
    /// Upper bound on extension headers walked per packet.
    #[serde(default = "default_max_extension_headers")]
    pub max_extension_headers: usize,
}

fn default_max_extension_headers() -> usize {
    DEFAULT_MAX_EXTENSION_HEADERS
}

impl Default for Ipv6Config {
    fn default() -> Self {
        Self {
            max_extension_headers: DEFAULT_MAX_EXTENSION_HEADERS,
        }
    }
}

/// Logging settings consumed by [`crate::utils::logging::init`].
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Maximum level to emit: trace, debug, info, warn or error.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Optional `tracing_subscriber::EnvFilter` directive string; overrides
    /// `level` when set.
    #[serde(default)]
    pub filter: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            filter: None,
        }
    }
}
