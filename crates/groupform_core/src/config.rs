//! Runtime configuration for the registration core.
//!
//! # Responsibility
//! - Load settings from an optional TOML file.
//! - Apply `GROUPFORM_*` environment overrides on top of file values.
//!
//! # Invariants
//! - A deletion passphrase must be configured; there is no built-in default.
//! - Environment values win over file values.

use crate::deletion::DeletionSecret;
use crate::logging::default_log_level;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub const ENV_DELETE_PASSPHRASE: &str = "GROUPFORM_DELETE_PASSPHRASE";
pub const ENV_DB_PATH: &str = "GROUPFORM_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "GROUPFORM_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "GROUPFORM_LOG_DIR";
pub const ENV_PARTICIPANT_ID: &str = "GROUPFORM_PARTICIPANT_ID";

/// Configuration loading errors.
#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse(toml::de::Error),
    MissingPassphrase,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid config: {err}"),
            Self::MissingPassphrase => write!(
                f,
                "deletion passphrase is not configured; set `deletion_passphrase` or {ENV_DELETE_PASSPHRASE}"
            ),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::MissingPassphrase => None,
        }
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(value: toml::de::Error) -> Self {
        Self::Parse(value)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawConfig {
    deletion_passphrase: Option<String>,
    db_path: Option<PathBuf>,
    log_level: Option<String>,
    log_dir: Option<PathBuf>,
    participant_id: Option<String>,
}

/// Resolved core configuration.
#[derive(Debug, Clone)]
pub struct CoreConfig {
    pub deletion_secret: DeletionSecret,
    /// SQLite file; `None` means an in-memory database.
    pub db_path: Option<PathBuf>,
    pub log_level: String,
    /// Rolling log directory; `None` disables file logging.
    pub log_dir: Option<PathBuf>,
    /// Fixed participant identity; `None` lets the caller assign one.
    pub participant_id: Option<String>,
}

impl CoreConfig {
    /// Loads `path` when given, then applies process environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let contents = match path {
            Some(path) => Some(std::fs::read_to_string(path).map_err(|source| {
                ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                }
            })?),
            None => None,
        };
        Self::from_sources(contents.as_deref(), |key| std::env::var(key).ok())
    }

    /// Resolves configuration from TOML text and an environment lookup.
    pub fn from_sources(
        toml_text: Option<&str>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let raw: RawConfig = match toml_text {
            Some(text) => toml::from_str(text)?,
            None => RawConfig::default(),
        };
        let env_value = |key: &str| env(key).filter(|value| !value.trim().is_empty());

        let deletion_secret = env_value(ENV_DELETE_PASSPHRASE)
            .or(raw.deletion_passphrase)
            .and_then(DeletionSecret::new)
            .ok_or(ConfigError::MissingPassphrase)?;

        Ok(Self {
            deletion_secret,
            db_path: env_value(ENV_DB_PATH).map(PathBuf::from).or(raw.db_path),
            log_level: env_value(ENV_LOG_LEVEL)
                .or(raw.log_level)
                .unwrap_or_else(|| default_log_level().to_string()),
            log_dir: env_value(ENV_LOG_DIR).map(PathBuf::from).or(raw.log_dir),
            participant_id: env_value(ENV_PARTICIPANT_ID).or(raw.participant_id),
        })
    }
}
