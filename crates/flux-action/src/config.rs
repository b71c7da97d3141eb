//! Validator configuration
//!
//! Loaded from a TOML file such as:
//!
//! ```toml
//! allowed_keys = ["type", "payload", "error", "meta", "sequence"]
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Rules applied by [`crate::FsaValidator`]
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct FsaConfig {
    /// Keys a well-formed action may carry
    #[serde(default = "default_allowed_keys")]
    pub allowed_keys: Vec<String>,
}

fn default_allowed_keys() -> Vec<String> {
    ["type", "payload", "error", "meta"]
        .into_iter()
        .map(String::from)
        .collect()
}

impl Default for FsaConfig {
    fn default() -> Self {
        Self {
            allowed_keys: default_allowed_keys(),
        }
    }
}

impl FsaConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load config from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        log::debug!("Loaded FSA config from {}", path.display());
        Ok(config)
    }

    /// Load config from a TOML file, falling back to defaults
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                log::warn!(
                    "Failed to load FSA config from {}: {}, using defaults",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }
}
