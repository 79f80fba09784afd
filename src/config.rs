//! Marshalling configuration
//!
//! Knobs that shape generated script and bound inbound work. Which
//! converters exist is decided in code, not here.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MarshalConfig {
    /// Prefix of generated variable names (`s0`, `s1`, ...)
    pub name_prefix: String,
    /// Names generated script must never declare
    pub reserved_names: Vec<String>,
    /// Write characters above U+007F as `\uXXXX` in string literals
    pub escape_non_ascii: bool,
    /// Maximum nesting of inbound converter calls within one call. Every
    /// level counts, `option<T>` wrappers included, so a chain linked
    /// through optional fields uses two levels per object.
    pub max_inbound_depth: usize,
}

impl Default for MarshalConfig {
    fn default() -> Self {
        Self {
            name_prefix: "s".to_string(),
            reserved_names: Vec::new(),
            escape_non_ascii: true,
            max_inbound_depth: 512,
        }
    }
}

impl MarshalConfig {
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: MarshalConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut chars = self.name_prefix.chars();
        let valid_start = chars
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$');
        if !valid_start || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$') {
            return Err(ConfigError::Invalid(format!(
                "name_prefix {:?} is not an identifier",
                self.name_prefix
            )));
        }
        if self.max_inbound_depth == 0 {
            return Err(ConfigError::Invalid(
                "max_inbound_depth must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
