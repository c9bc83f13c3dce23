use std::fs;
use std::path::Path;

use super::ObserverConfig;
use crate::error::ConfigError;

/// Config file encodings understood by the loader
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Toml,
    Json,
}

impl ConfigFormat {
    /// Pick the format from a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_lowercase().as_str() {
            "yml" | "yaml" => Some(Self::Yaml),
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

impl ObserverConfig {
    /// Read and deserialize the config file at `path`.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let format = ConfigFormat::from_path(path)
            .ok_or_else(|| ConfigError::UnsupportedFormat(path.to_path_buf()))?;

        let raw = fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;

        Self::from_str_with(&raw, format)
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self, ConfigError> {
        Self::from_str_with(raw, ConfigFormat::Yaml)
    }

    pub fn from_str_with(raw: &str, format: ConfigFormat) -> Result<Self, ConfigError> {
        let parsed = match format {
            ConfigFormat::Yaml => serde_yaml::from_str(raw).map_err(|e| e.to_string()),
            ConfigFormat::Toml => toml::from_str(raw).map_err(|e| e.to_string()),
            ConfigFormat::Json => serde_json::from_str(raw).map_err(|e| e.to_string()),
        };
        parsed.map_err(ConfigError::Parse)
    }
}
