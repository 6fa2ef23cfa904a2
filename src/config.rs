//! Scheduling configuration file support.
//!
//! The policy flags can be read from a TOML file and overridden through
//! environment variables:
//!
//! ```toml
//! [policy]
//! reject_past_timestamps_on_construct = false
//! legacy_duration_error_kind = false
//! ```

use log::info;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::db::repository::{ErrorContext, RepositoryError};
use crate::models::SchedulingPolicy;

/// Overrides `policy.reject_past_timestamps_on_construct`.
pub const ENV_REJECT_PAST_TIMESTAMPS: &str = "SCHEDULING_REJECT_PAST_TIMESTAMPS";
/// Overrides `policy.legacy_duration_error_kind`.
pub const ENV_LEGACY_DURATION_ERROR: &str = "SCHEDULING_LEGACY_DURATION_ERROR";

/// Default file name searched by [`SchedulingConfig::from_default_location`].
pub const CONFIG_FILE_NAME: &str = "scheduling.toml";

/// Scheduling configuration from file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulingConfig {
    #[serde(default)]
    pub policy: SchedulingPolicy,
}

impl SchedulingConfig {
    /// Parse configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, RepositoryError> {
        toml::from_str(content).map_err(|e| {
            RepositoryError::configuration_with_context(
                format!("Failed to parse config: {}", e),
                ErrorContext::new("parse_config"),
            )
        })
    }

    /// Load configuration from a TOML file.
    ///
    /// # Returns
    /// * `Ok(SchedulingConfig)` if successful
    /// * `Err(RepositoryError)` if file cannot be read or parsed
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, RepositoryError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            RepositoryError::configuration_with_context(
                format!("Failed to read config file: {}", e),
                ErrorContext::new("load_config").with_details(path.display().to_string()),
            )
        })?;

        let config = Self::from_toml_str(&content).map_err(|e| {
            e.with_operation("load_config")
                .with_details(path.display().to_string())
        })?;
        info!("loaded scheduling config from {}", path.display());
        Ok(config)
    }

    /// Load configuration from the default location.
    ///
    /// Searches for `scheduling.toml` in:
    /// 1. Current directory
    /// 2. `config/` directory
    /// 3. Parent directory
    pub fn from_default_location() -> Result<Self, RepositoryError> {
        let search_paths = [
            PathBuf::from(CONFIG_FILE_NAME),
            PathBuf::from("config").join(CONFIG_FILE_NAME),
            PathBuf::from("..").join(CONFIG_FILE_NAME),
        ];

        for path in &search_paths {
            if path.exists() {
                return Self::from_file(path);
            }
        }

        Err(RepositoryError::configuration(format!(
            "No {} found in standard locations",
            CONFIG_FILE_NAME
        )))
    }

    /// Apply `SCHEDULING_*` environment overrides.
    ///
    /// Accepted values: `true`/`false`, `1`/`0`, `yes`/`no`, `on`/`off`.
    pub fn with_env_overrides(mut self) -> Result<Self, RepositoryError> {
        if let Some(value) = read_bool_env(ENV_REJECT_PAST_TIMESTAMPS)? {
            self.policy.reject_past_timestamps_on_construct = value;
        }
        if let Some(value) = read_bool_env(ENV_LEGACY_DURATION_ERROR)? {
            self.policy.legacy_duration_error_kind = value;
        }
        Ok(self)
    }

    /// Defaults plus environment overrides, without reading any file.
    pub fn from_env() -> Result<Self, RepositoryError> {
        Self::default().with_env_overrides()
    }

    pub fn policy(&self) -> SchedulingPolicy {
        self.policy
    }

    pub fn to_toml_string(&self) -> Result<String, RepositoryError> {
        toml::to_string(self).map_err(|e| RepositoryError::serialization(e.to_string()))
    }
}

fn read_bool_env(key: &str) -> Result<Option<bool>, RepositoryError> {
    let Ok(raw) = env::var(key) else {
        return Ok(None);
    };
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(Some(true)),
        "0" | "false" | "no" | "off" => Ok(Some(false)),
        other => Err(RepositoryError::configuration_with_context(
            format!("{} must be a boolean, got '{}'", key, other),
            ErrorContext::new("env_override").with_details(key),
        )),
    }
}
