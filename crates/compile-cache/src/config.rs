//! Configuration for the model cache loader.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the TOML table that holds loader settings.
pub const CONFIG_SECTION: &str = "model_cache";

/// How a freshly built entry is written to disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteMode {
    /// Truncate and write the target file in place.
    #[default]
    Direct,
    /// Write a sibling temp file, then rename it over the target.
    ///
    /// Readers never observe a partially written entry. Concurrent writers are
    /// still not serialised.
    AtomicRename,
}

/// What to do when a built model cannot be persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersistFailurePolicy {
    /// Return the write error to the caller.
    #[default]
    Propagate,
    /// Log a warning and return the built model anyway.
    Warn,
}

/// Configuration for the model cache loader.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoaderConfig {
    /// Directory holding cache entries (default: the working directory).
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,

    #[serde(default)]
    pub write_mode: WriteMode,

    #[serde(default)]
    pub on_persist_failure: PersistFailurePolicy,

    /// Create `cache_dir` before writing if it does not exist.
    #[serde(default = "default_create_dir")]
    pub create_dir: bool,
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_create_dir() -> bool {
    true
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            cache_dir: default_cache_dir(),
            write_mode: WriteMode::default(),
            on_persist_failure: PersistFailurePolicy::default(),
            create_dir: default_create_dir(),
        }
    }
}

/// Errors that can occur when loading or validating loader configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file not found.
    #[error("configuration file not found: {0}")]
    NotFound(String),

    /// I/O error reading config file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Configuration validation error.
    #[error("configuration validation error: {0}")]
    Validation(String),
}

impl LoaderConfig {
    /// Config rooted at `cache_dir`, everything else default.
    #[must_use]
    pub fn with_cache_dir(cache_dir: impl Into<PathBuf>) -> Self {
        Self { cache_dir: cache_dir.into(), ..Self::default() }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache_dir.as_os_str().is_empty() {
            return Err(ConfigError::Validation("cache_dir must not be empty".to_string()));
        }
        Ok(())
    }

    /// Load configuration from the `[model_cache]` table of a TOML file.
    ///
    /// A file without that table yields the defaults.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }

        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Like [`LoaderConfig::load_from_file`], but a missing file yields the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        match Self::load_from_file(path) {
            Err(ConfigError::NotFound(_)) => Ok(Self::default()),
            other => other,
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let mut table: toml::Table = toml::from_str(content)?;

        let config: Self = match table.remove(CONFIG_SECTION) {
            Some(section) => section.try_into()?,
            None => Self::default(),
        };

        config.validate()?;
        Ok(config)
    }
}
