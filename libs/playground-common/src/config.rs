// Relay policy configuration
// Loaded from config/relay.json when present, then overridden from the environment

use crate::languages::LanguageMapping;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

pub const DEFAULT_BACKEND_URL: &str = "https://emkc.org/api/v2/piston/execute";
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;
/// Backend sentinel for "no memory limit"
pub const UNLIMITED_MEMORY: i64 = -1;
/// Version marker asking the backend for its latest runtime
pub const LATEST_VERSION: &str = "*";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Policy handed to the relay at construction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    pub backend_url: String,
    pub compile_timeout_ms: u64,
    pub run_timeout_ms: u64,
    /// Applied to both compile and run stages; `-1` means unlimited
    pub memory_limit: i64,
    pub language_aliases: LanguageMapping,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            compile_timeout_ms: DEFAULT_TIMEOUT_MS,
            run_timeout_ms: DEFAULT_TIMEOUT_MS,
            memory_limit: UNLIMITED_MEMORY,
            language_aliases: LanguageMapping::default(),
        }
    }
}

impl RelayConfig {
    /// Load from a JSON file. Fields missing from the file keep their defaults.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;

        let config: RelayConfig =
            serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.display().to_string(),
                source,
            })?;

        config.validate()?;
        Ok(config)
    }

    /// File (if it exists) + environment overrides
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            Self::load_from_file(path)?
        } else {
            tracing::debug!(path = %path.display(), "Relay config file not found, using defaults");
            Self::default()
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `EXEC_*` overrides from a key lookup (normally the process environment)
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("EXEC_BACKEND_URL") {
            self.backend_url = url;
        }
        if let Some(value) = lookup("EXEC_COMPILE_TIMEOUT_MS") {
            self.compile_timeout_ms = parse_value("EXEC_COMPILE_TIMEOUT_MS", &value)?;
        }
        if let Some(value) = lookup("EXEC_RUN_TIMEOUT_MS") {
            self.run_timeout_ms = parse_value("EXEC_RUN_TIMEOUT_MS", &value)?;
        }
        if let Some(value) = lookup("EXEC_MEMORY_LIMIT") {
            self.memory_limit = parse_value("EXEC_MEMORY_LIMIT", &value)?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.backend_url.starts_with("http://") && !self.backend_url.starts_with("https://") {
            return Err(ConfigError::Invalid(format!(
                "backend_url must be an http(s) URL, got '{}'",
                self.backend_url
            )));
        }
        if self.compile_timeout_ms == 0 || self.run_timeout_ms == 0 {
            return Err(ConfigError::Invalid("timeouts must be greater than zero".to_string()));
        }
        if self.memory_limit < UNLIMITED_MEMORY {
            return Err(ConfigError::Invalid(format!(
                "memory_limit must be -1 (unlimited) or a positive value, got {}",
                self.memory_limit
            )));
        }
        if self.language_aliases.is_empty() {
            return Err(ConfigError::Invalid("No language aliases configured".to_string()));
        }
        Ok(())
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}
