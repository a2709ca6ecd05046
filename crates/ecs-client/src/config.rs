//! Client settings.
//!
//! Settings resolve in layers: built-in defaults, then an optional JSON
//! settings file, then overrides from the environment and command line
//! (applied by the caller).

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use ecs_map::{DEFAULT_MAX_DEPTH, PathExtractor};
use ecs_model::{BatchConfig, DEFAULT_LIMIT, DEFAULT_MODEL, DEFAULT_PAGE_SIZE, DEFAULT_SOURCETYPE};

/// Origin of the local development backend.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Environment variable overriding the backend origin.
pub const BASE_URL_ENV_VAR: &str = "ECS_MAPPER_URL";

/// Failure loading settings or building a client from them.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("Failed to read settings file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid settings file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("Failed to create HTTP client: {0}")]
    Http(String),
}

/// Settings for talking to the mapping backend and building batches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Backend origin, e.g. `http://localhost:8000`.
    pub base_url: String,
    /// Source type stamped on every batch item.
    pub sourcetype: String,
    /// Classifier model identifier.
    pub model: String,
    /// Retrieval candidates per field.
    pub limit: u32,
    /// Deepest nesting level the extractor descends to.
    pub max_depth: usize,
    /// Rows requested per mappings page.
    pub page_size: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            sourcetype: DEFAULT_SOURCETYPE.to_string(),
            model: DEFAULT_MODEL.to_string(),
            limit: DEFAULT_LIMIT,
            max_depth: DEFAULT_MAX_DEPTH,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ClientConfig {
    /// Load settings from a JSON file. Missing keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!("Loaded settings from {}", path.display());
        Ok(config)
    }

    /// Defaults, or the settings file at `path` when given.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        path.map_or_else(|| Ok(Self::default()), Self::from_file)
    }

    /// Batch parameters derived from these settings.
    #[must_use]
    pub fn batch_config(&self) -> BatchConfig {
        BatchConfig {
            sourcetype: self.sourcetype.clone(),
            model: self.model.clone(),
            limit: self.limit,
        }
    }

    #[must_use]
    pub fn extractor(&self) -> PathExtractor {
        PathExtractor::new(self.max_depth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_dev_backend() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "http://localhost:8000");
        assert_eq!(config.batch_config(), BatchConfig::default());
        assert_eq!(config.extractor(), PathExtractor::default());
        assert_eq!(config.page_size, 25);
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let config: ClientConfig =
            serde_json::from_str(r#"{"base_url": "http://mapper:9000", "limit": 8}"#).unwrap();
        assert_eq!(config.base_url, "http://mapper:9000");
        assert_eq!(config.limit, 8);
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
    }

    #[test]
    fn load_without_path_is_default() {
        assert_eq!(ClientConfig::load(None).unwrap(), ClientConfig::default());
    }
}
