//! Application configuration loaded from TOML.
//!
//! # Invariants
//! - Every field has a default, so an empty file is a valid config.
//! - `validate` runs on every load; invalid files are rejected whole.

use crate::logging::default_log_level;
use crate::persistence::DEFAULT_PREFIX;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug)]
pub enum ConfigError {
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    Validation(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "failed to parse config `{}`: {source}", path.display())
            }
            Self::Validation(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::Validation(_) => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

/// File name of the database when no path is configured.
pub const DEFAULT_DB_FILE: &str = "mindscribe.db";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    /// Database file. Relative paths resolve against the config file's
    /// directory, or the working directory without a config file.
    pub path: PathBuf,
    /// Keep everything in a throwaway in-memory database instead.
    pub in_memory: bool,
    /// Namespace prefix for stored collection keys.
    pub prefix: String,
    /// Seed sample records into empty collections.
    pub seed_samples: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_DB_FILE),
            in_memory: false,
            prefix: DEFAULT_PREFIX.to_string(),
            seed_samples: true,
        }
    }
}

impl StorageConfig {
    /// Database file to open, or `None` for an in-memory store.
    pub fn database_path(&self) -> Option<&Path> {
        if self.in_memory {
            None
        } else {
            Some(&self.path)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    pub level: String,
    /// Absolute log directory; logging stays off when unset.
    pub dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level().to_string(),
            dir: None,
        }
    }
}

impl AppConfig {
    /// Reads, parses and validates a config file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: Self = toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        if config.storage.path.is_relative() {
            if let Some(dir) = path.parent() {
                config.storage.path = dir.join(&config.storage.path);
            }
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if !self.storage.in_memory && self.storage.path.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "storage.path must be non-empty".to_string(),
            ));
        }
        if self.storage.prefix.trim().is_empty() {
            return Err(ConfigError::Validation(
                "storage.prefix must be non-empty".to_string(),
            ));
        }
        if let Some(dir) = &self.logging.dir {
            if !dir.is_absolute() {
                return Err(ConfigError::Validation(format!(
                    "logging.dir must be an absolute path, got `{}`",
                    dir.display()
                )));
            }
        }
        if !matches!(
            self.logging.level.trim().to_ascii_lowercase().as_str(),
            "trace" | "debug" | "info" | "warn" | "warning" | "error"
        ) {
            return Err(ConfigError::Validation(format!(
                "logging.level `{}` is not one of trace|debug|info|warn|error",
                self.logging.level
            )));
        }
        Ok(())
    }
}
