//! Application configuration loading and validation.
//!
//! Provides the main [`Config`] struct that aggregates all settings. Every
//! field has a default, so an empty file is a valid configuration.
//!
//! # Example
//!
//! ```no_run
//! use gdploa::infrastructure::config::settings::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("gdploa.toml")?;
//!     config.init_logging();
//!     Ok(())
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::logging::LoggingConfig;
use crate::application::LoaConfig;
use crate::error::{ConfigError, Result};

/// Main application configuration.
///
/// Load from a TOML file using [`Config::load`] or parse directly with
/// [`Config::parse_toml`].
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Logging and tracing configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Decomposition settings.
    #[serde(default)]
    pub loa: LoaConfig,
}

impl Config {
    /// Parse and validate configuration from TOML content.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML content is malformed or validation fails.
    pub fn parse_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read
    /// - The TOML content is malformed
    /// - Validation fails
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    /// Validate every section.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<()> {
        self.logging.validate()?;
        self.loa.validate()?;
        Ok(())
    }

    /// Render as TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| ConfigError::Serialize(e).into())
    }

    /// Initialize logging based on configuration.
    pub fn init_logging(&self) {
        self.logging.init();
    }
}
