//! Configuration schema (snowdiff.toml)

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Default catalog-query cache TTL in seconds
pub const DEFAULT_CACHE_TTL_SECS: u64 = 600;

fn default_cache_ttl_secs() -> u64 {
    DEFAULT_CACHE_TTL_SECS
}

/// Warehouse connection configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WarehouseConfig {
    /// Warehouse type (currently only "snowflake")
    #[serde(rename = "type")]
    pub warehouse_type: String,

    /// Connection settings (warehouse-specific)
    #[serde(flatten)]
    pub settings: HashMap<String, String>,
}

impl Default for WarehouseConfig {
    fn default() -> Self {
        Self {
            warehouse_type: "snowflake".to_string(),
            settings: HashMap::new(),
        }
    }
}

impl WarehouseConfig {
    /// Get a required setting, with a readable error when absent
    pub fn required(&self, key: &str) -> Result<&str, ConfigError> {
        self.settings.get(key).map(String::as_str).ok_or_else(|| {
            ConfigError::MissingSetting(format!(
                "warehouse setting '{}' is required for type '{}'",
                key, self.warehouse_type
            ))
        })
    }
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Warehouse connection configuration
    #[serde(default)]
    pub warehouse: Option<WarehouseConfig>,

    /// Catalog-query cache TTL in seconds
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            warehouse: None,
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
        }
    }
}

impl Config {
    /// Load config from a TOML file
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
        Self::from_toml(&contents)
    }

    /// Load config from a TOML string
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Save config to a TOML file
    pub fn save_to_file(&self, path: &std::path::Path) -> Result<(), ConfigError> {
        let toml = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;
        std::fs::write(path, toml).map_err(|e| ConfigError::IoError(e.to_string()))?;
        Ok(())
    }

    /// Cache TTL as a duration
    pub fn cache_ttl(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.cache_ttl_secs)
    }
}

/// Config error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),

    #[error("Missing setting: {0}")]
    MissingSetting(String),
}
