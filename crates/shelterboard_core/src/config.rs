//! Dashboard configuration.
//!
//! # Responsibility
//! - Load settings from an optional JSON file.
//! - Apply environment overrides and validate the result.
//!
//! # Invariants
//! - `page_size` is within `1..=MAX_PAGE_SIZE`.
//! - `sync_interval_secs` is non-zero.
//! - `log_dir`, when set, is absolute.
//! - The API key never appears in `Debug` output.

use crate::ingest::shelterluv::{DEFAULT_API_BASE_URL, MAX_PAGE_SIZE};
use crate::logging::default_log_level;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::path::{Path, PathBuf};

pub const ENV_DB_PATH: &str = "SHELTERBOARD_DB_PATH";
pub const ENV_API_BASE_URL: &str = "SHELTERBOARD_API_BASE_URL";
pub const ENV_API_KEY: &str = "SHELTERLUV_API_KEY";
pub const ENV_LOG_LEVEL: &str = "SHELTERBOARD_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "SHELTERBOARD_LOG_DIR";

const DEFAULT_DB_FILE_NAME: &str = "shelterboard.sqlite3";
const DEFAULT_SYNC_INTERVAL_SECS: u64 = 15 * 60;

/// Errors from loading or validating configuration.
#[derive(Debug)]
pub enum ConfigError {
    Read { path: PathBuf, source: std::io::Error },
    Parse { path: PathBuf, message: String },
    Invalid { field: &'static str, reason: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse { path, message } => {
                write!(f, "failed to parse config `{}`: {message}", path.display())
            }
            Self::Invalid { field, reason } => write!(f, "invalid config `{field}`: {reason}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
            Self::Parse { .. } | Self::Invalid { .. } => None,
        }
    }
}

/// Runtime settings for the dashboard and the ingestion job.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DashboardConfig {
    pub db_path: PathBuf,
    pub api_base_url: String,
    pub api_key: Option<String>,
    pub page_size: u32,
    pub sync_interval_secs: u64,
    pub log_level: String,
    /// Rolling log directory; `None` logs to stderr.
    pub log_dir: Option<PathBuf>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_FILE_NAME),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            api_key: None,
            page_size: MAX_PAGE_SIZE,
            sync_interval_secs: DEFAULT_SYNC_INTERVAL_SECS,
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl Debug for DashboardConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DashboardConfig")
            .field("db_path", &self.db_path)
            .field("api_base_url", &self.api_base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("page_size", &self.page_size)
            .field("sync_interval_secs", &self.sync_interval_secs)
            .field("log_level", &self.log_level)
            .field("log_dir", &self.log_dir)
            .finish()
    }
}

impl DashboardConfig {
    /// Loads the file (if any), applies process environment overrides and
    /// validates.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text).map_err(|message| ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        })
    }

    pub fn from_json(text: &str) -> Result<Self, String> {
        serde_json::from_str(text).map_err(|err| err.to_string())
    }

    /// Overrides fields from `lookup`; blank values are ignored.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(value) = lookup(ENV_DB_PATH) {
            self.db_path = PathBuf::from(value);
        }
        if let Some(value) = lookup(ENV_API_BASE_URL) {
            self.api_base_url = value;
        }
        if let Some(value) = lookup(ENV_API_KEY) {
            self.api_key = Some(value);
        }
        if let Some(value) = lookup(ENV_LOG_LEVEL) {
            self.log_level = value;
        }
        if let Some(value) = lookup(ENV_LOG_DIR) {
            self.log_dir = Some(PathBuf::from(value));
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.db_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid {
                field: "db_path",
                reason: "must not be empty".to_string(),
            });
        }
        if self.api_base_url.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "api_base_url",
                reason: "must not be empty".to_string(),
            });
        }
        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            return Err(ConfigError::Invalid {
                field: "page_size",
                reason: format!("must be within 1..={MAX_PAGE_SIZE}"),
            });
        }
        if self.sync_interval_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "sync_interval_secs",
                reason: "must be greater than zero".to_string(),
            });
        }
        if let Some(log_dir) = &self.log_dir {
            if !log_dir.is_absolute() {
                return Err(ConfigError::Invalid {
                    field: "log_dir",
                    reason: format!("must be absolute, got `{}`", log_dir.display()),
                });
            }
        }
        Ok(())
    }

    /// API key, or an error naming the variable to set.
    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        self.api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| ConfigError::Invalid {
                field: "api_key",
                reason: format!("set `{ENV_API_KEY}` or `api_key` in the config file"),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, DashboardConfig, ENV_API_KEY, ENV_DB_PATH, ENV_LOG_DIR};
    use std::collections::HashMap;
    use std::path::PathBuf;

    #[test]
    fn partial_file_keeps_defaults() {
        let config = DashboardConfig::from_json(r#"{"page_size": 25}"#).unwrap();
        assert_eq!(config.page_size, 25);
        assert_eq!(config.sync_interval_secs, 900);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(DashboardConfig::from_json(r#"{"pagesize": 25}"#).is_err());
    }

    #[test]
    fn env_overrides_win_and_blank_values_are_ignored() {
        let env: HashMap<&str, &str> = HashMap::from([
            (ENV_DB_PATH, "/var/lib/shelterboard.db"),
            (ENV_API_KEY, "secret"),
            (ENV_LOG_DIR, "  "),
        ]);
        let mut config = DashboardConfig::default();
        config.apply_env_overrides(|key| env.get(key).map(|value| value.to_string()));

        assert_eq!(config.db_path, PathBuf::from("/var/lib/shelterboard.db"));
        assert_eq!(config.require_api_key().unwrap(), "secret");
        assert_eq!(config.log_dir, None);
        assert!(!format!("{config:?}").contains("secret"));
    }

    #[test]
    fn validation_rejects_bad_values() {
        let config = DashboardConfig {
            page_size: 500,
            ..DashboardConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid {
                field: "page_size",
                ..
            })
        ));

        let config = DashboardConfig {
            log_dir: Some(PathBuf::from("logs")),
            ..DashboardConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid {
                field: "log_dir",
                ..
            })
        ));

        assert!(DashboardConfig::default().require_api_key().is_err());
    }
}
