//! Configuration loading and typed config structures for the bounty board.
//!
//! The canonical configuration lives in `bounty-config.yaml` at the project
//! root. Every field has a default, so an empty file (or no file at all)
//! yields a working live-server configuration.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use bounty_ledger::LedgerRules;

/// Environment variable that overrides `storage.path`.
pub const STORE_PATH_ENV: &str = "BOUNTY_STORE_PATH";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level bounty board configuration.
///
/// Mirrors the structure of `bounty-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BountyConfig {
    /// Game-balance rules for the ledger.
    #[serde(default)]
    pub rules: LedgerRules,

    /// Where the ledger record lives.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Checkpoint cadence.
    #[serde(default)]
    pub checkpoint: CheckpointConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Player roster source for the standalone host.
    #[serde(default)]
    pub roster: RosterConfig,
}

impl BountyConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// `BOUNTY_STORE_PATH` overrides `storage.path` when set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::parse_raw(&contents)?;
        config.storage.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config = Self::parse_raw(yaml)?;
        config.storage.apply_env_overrides();
        Ok(config)
    }

    fn parse_raw(yaml: &str) -> Result<Self, ConfigError> {
        // serde_yml reads an empty document as null rather than an empty map.
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yml::from_str(yaml)?)
    }
}

/// Storage configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StorageConfig {
    /// Path of the ledger record.
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
}

impl StorageConfig {
    /// Override the record path with `BOUNTY_STORE_PATH` when set.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var(STORE_PATH_ENV) {
            self.path = PathBuf::from(val);
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

/// Checkpoint configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct CheckpointConfig {
    /// Seconds between world saves.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

impl Default for CheckpointConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Roster configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RosterConfig {
    /// Path of the roster YAML file.
    #[serde(default = "default_roster_path")]
    pub path: PathBuf,
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            path: default_roster_path(),
        }
    }
}

fn default_store_path() -> PathBuf {
    PathBuf::from("saves/bounty.jsonl")
}

const fn default_interval_secs() -> u64 {
    300
}

fn default_log_level() -> String {
    "info".to_owned()
}

fn default_roster_path() -> PathBuf {
    PathBuf::from("roster.yaml")
}
