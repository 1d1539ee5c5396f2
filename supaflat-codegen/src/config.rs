//! Configuration surface.
//!
//! The configuration is a JSON object with a single `namingConfig` member.
//! Missing keys take their defaults; unknown keys are rejected.

use crate::error::ConfigError;
use crate::naming::NamingConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct Config {
    /// Name templates and capitalization settings.
    pub naming_config: NamingConfig,
}

impl Config {
    /// Decodes and validates a configuration from JSON text.
    ///
    /// # Errors
    /// Returns `ConfigError` if the JSON is malformed or the templates are invalid.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.naming_config.validate()?;
        Ok(config)
    }

    /// Reads and validates a configuration file.
    ///
    /// # Errors
    /// Returns `ConfigError` if reading, decoding or validation fails.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        tracing::debug!("Loaded naming configuration from {}", path.display());
        Ok(config)
    }
}
