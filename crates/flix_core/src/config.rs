//! Process configuration.
//!
//! # Responsibility
//! - Resolve database, data and logging locations from the environment.
//! - Load an optional `.env` file before reading the environment.
//!
//! # Invariants
//! - A missing `.env` file is not an error; a malformed one is.
//! - `log_dir` is always absolute after loading.

use crate::logging::default_log_level;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const DATABASE_PATH_KEY: &str = "FLIX_DATABASE_PATH";
pub const DATA_DIR_KEY: &str = "FLIX_DATA_DIR";
pub const LOG_LEVEL_KEY: &str = "FLIX_LOG_LEVEL";
pub const LOG_DIR_KEY: &str = "FLIX_LOG_DIR";
pub const POPULATE_KEY: &str = "FLIX_POPULATE";

const DEFAULT_DATABASE_PATH: &str = "flix.db";
const DEFAULT_DATA_DIR: &str = "data";
const DEFAULT_LOG_DIR_NAME: &str = "flix-logs";

#[derive(Debug)]
pub enum ConfigError {
    EnvFile(dotenvy::Error),
    InvalidValue {
        key: &'static str,
        value: String,
        reason: &'static str,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EnvFile(err) => write!(f, "failed to load .env file: {err}"),
            Self::InvalidValue { key, value, reason } => {
                write!(f, "invalid value `{value}` for {key}: {reason}")
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::EnvFile(err) => Some(err),
            Self::InvalidValue { .. } => None,
        }
    }
}

impl From<dotenvy::Error> for ConfigError {
    fn from(value: dotenvy::Error) -> Self {
        Self::EnvFile(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlixConfig {
    pub database_path: PathBuf,
    /// Directory holding the CSV sources.
    pub data_dir: PathBuf,
    pub log_level: String,
    pub log_dir: PathBuf,
    /// Populate an empty store before serving.
    pub populate_on_startup: bool,
}

impl Default for FlixConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from(DEFAULT_DATABASE_PATH),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            log_level: default_log_level().to_string(),
            log_dir: std::env::temp_dir().join(DEFAULT_LOG_DIR_NAME),
            populate_on_startup: true,
        }
    }
}

impl FlixConfig {
    /// Loads `.env` when present, then reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(_) | Err(dotenvy::Error::Io(_)) => {}
            Err(err) => return Err(err.into()),
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a configuration from `lookup`, falling back to defaults for
    /// unset or blank keys.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|raw| !raw.is_empty())
        };
        let mut config = Self::default();

        if let Some(path) = value(DATABASE_PATH_KEY) {
            config.database_path = PathBuf::from(path);
        }
        if let Some(path) = value(DATA_DIR_KEY) {
            config.data_dir = PathBuf::from(path);
        }
        if let Some(level) = value(LOG_LEVEL_KEY) {
            config.log_level = parse_level(level)?;
        }
        if let Some(dir) = value(LOG_DIR_KEY) {
            config.log_dir = parse_log_dir(dir)?;
        }
        if let Some(flag) = value(POPULATE_KEY) {
            config.populate_on_startup = parse_flag(POPULATE_KEY, flag)?;
        }

        Ok(config)
    }
}

fn parse_level(level: String) -> Result<String, ConfigError> {
    match level.to_ascii_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(level.to_ascii_lowercase()),
        "warning" => Ok("warn".to_string()),
        _ => Err(ConfigError::InvalidValue {
            key: LOG_LEVEL_KEY,
            value: level,
            reason: "expected trace|debug|info|warn|error",
        }),
    }
}

fn parse_log_dir(dir: String) -> Result<PathBuf, ConfigError> {
    let path = PathBuf::from(&dir);
    if !path.is_absolute() {
        return Err(ConfigError::InvalidValue {
            key: LOG_DIR_KEY,
            value: dir,
            reason: "must be an absolute path",
        });
    }
    Ok(path)
}

fn parse_flag(key: &'static str, flag: String) -> Result<bool, ConfigError> {
    match flag.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key,
            value: flag,
            reason: "expected a boolean",
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, FlixConfig, LOG_DIR_KEY, POPULATE_KEY};
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let values: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key| values.get(key).cloned()
    }

    #[test]
    fn empty_environment_yields_defaults() {
        let config = FlixConfig::from_lookup(|_| None).expect("defaults should load");
        assert_eq!(config, FlixConfig::default());
        assert!(config.log_dir.is_absolute());
    }

    #[test]
    fn environment_values_override_defaults() {
        let log_dir = std::env::temp_dir().join("flix-config-test");
        let config = FlixConfig::from_lookup(lookup_from(&[
            ("FLIX_DATABASE_PATH", "/var/lib/flix/catalog.db"),
            ("FLIX_DATA_DIR", " ./fixtures "),
            ("FLIX_LOG_LEVEL", "WARNING"),
            ("FLIX_LOG_DIR", log_dir.to_str().expect("temp dir should be utf-8")),
            ("FLIX_POPULATE", "off"),
        ]))
        .expect("valid values should load");

        assert_eq!(config.database_path, PathBuf::from("/var/lib/flix/catalog.db"));
        assert_eq!(config.data_dir, PathBuf::from("./fixtures"));
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.log_dir, log_dir);
        assert!(!config.populate_on_startup);
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let config = FlixConfig::from_lookup(lookup_from(&[("FLIX_DATABASE_PATH", "   ")]))
            .expect("blank value should be ignored");
        assert_eq!(config.database_path, PathBuf::from("flix.db"));
    }

    #[test]
    fn invalid_values_are_reported_with_their_key() {
        let error = FlixConfig::from_lookup(lookup_from(&[("FLIX_POPULATE", "maybe")]))
            .expect_err("non-boolean flag should fail");
        assert!(matches!(
            error,
            ConfigError::InvalidValue { key, ref value, .. } if key == POPULATE_KEY && value == "maybe"
        ));

        let error = FlixConfig::from_lookup(lookup_from(&[("FLIX_LOG_DIR", "logs/dev")]))
            .expect_err("relative log dir should fail");
        assert!(matches!(error, ConfigError::InvalidValue { key, .. } if key == LOG_DIR_KEY));
    }
}
