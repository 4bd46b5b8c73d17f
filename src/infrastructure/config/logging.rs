//! Logging configuration and initialization.

use serde::{Deserialize, Serialize};
use tracing_subscriber::{fmt, EnvFilter};

use crate::error::ConfigError;

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Default filter directive; `RUST_LOG` takes precedence.
    #[serde(default = "default_level")]
    pub level: String,
    /// `pretty` or `json`.
    #[serde(default = "default_format")]
    pub format: String,
}

impl LoggingConfig {
    /// Initialize the tracing subscriber with this logging configuration.
    pub fn init(&self) {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.level));

        match self.format.as_str() {
            "json" => {
                fmt().json().with_env_filter(filter).init();
            }
            _ => {
                fmt().with_env_filter(filter).init();
            }
        }
    }

    /// Reject unknown formats and unparsable filter directives.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] naming the offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !matches!(self.format.as_str(), "pretty" | "json") {
            return Err(ConfigError::InvalidValue {
                field: "logging.format",
                reason: format!("expected \"pretty\" or \"json\", got \"{}\"", self.format),
            });
        }
        EnvFilter::try_new(&self.level).map_err(|e| ConfigError::InvalidValue {
            field: "logging.level",
            reason: e.to_string(),
        })?;
        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: default_format(),
        }
    }
}

fn default_level() -> String {
    "info".into()
}

fn default_format() -> String {
    "pretty".into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert!(LoggingConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_unknown_format() {
        let config = LoggingConfig {
            format: "xml".into(),
            ..LoggingConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue {
                field: "logging.format",
                ..
            })
        ));
    }

    #[test]
    fn accepts_module_directives() {
        let config = LoggingConfig {
            level: "warn,gdploa::application=debug".into(),
            format: "json".into(),
        };
        assert!(config.validate().is_ok());
    }
}
