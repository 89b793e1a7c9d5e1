//! CLI configuration (`lineage.toml`)
//!
//! ```toml
//! log_filter = "lineage_resolve=debug,warn"
//!
//! [schema]
//! relation_keyword = "owns"
//! ```

use lineage_tree::SchemaConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default tracing filter when neither `RUST_LOG` nor the file sets one
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineageConfig {
    /// `tracing_subscriber::EnvFilter` directives
    pub log_filter: String,

    /// Schema loading options
    pub schema: SchemaConfig,
}

impl Default for LineageConfig {
    fn default() -> Self {
        Self {
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            schema: SchemaConfig::default(),
        }
    }
}

impl LineageConfig {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid or the relation keyword is
    /// empty or contains `-`.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        let keyword = &config.schema.relation_keyword;
        if keyword.is_empty() || keyword.contains('-') {
            return Err(ConfigError::Validation(format!(
                "relation_keyword must be non-empty and free of '-': '{keyword}'"
            )));
        }
        Ok(config)
    }

    /// Serialize configuration to TOML
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// I/O error reading configuration file
    #[error("failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// TOML serialization error
    #[error("failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// Validation error
    #[error("configuration validation failed: {0}")]
    Validation(String),
}
