//! TOML-based review configuration.
//!
//! Stores:
//! - Thresholds for the built-in review conditions
//! - An optional override for the tracked settings file
//!
//! Configuration is stored at `~/.config/review-prompt/config.toml`.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use super::file::SETTINGS_FILE_NAME;
use crate::builder::{
    ReviewConditionsBuilder, DEFAULT_MINIMUM_APPLICATION_LAUNCHES,
    DEFAULT_MINIMUM_DAYS_SINCE_FIRST_LAUNCH, DEFAULT_MINIMUM_DAYS_SINCE_LAST_REQUEST,
    DEFAULT_MINIMUM_PRIMARY_ACTIONS,
};
use crate::error::ConfigError;
use crate::settings::TrackedSettings;

pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Thresholds for the built-in conditions.
///
/// A threshold of `0` leaves its condition out of the policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    pub minimum_primary_actions: u32,
    pub minimum_secondary_actions: u32,
    pub minimum_application_launches: u32,
    pub minimum_days_since_first_launch: u32,
    pub minimum_days_since_last_request: u32,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            minimum_primary_actions: DEFAULT_MINIMUM_PRIMARY_ACTIONS,
            minimum_secondary_actions: 0,
            minimum_application_launches: DEFAULT_MINIMUM_APPLICATION_LAUNCHES,
            minimum_days_since_first_launch: DEFAULT_MINIMUM_DAYS_SINCE_FIRST_LAUNCH as u32,
            minimum_days_since_last_request: DEFAULT_MINIMUM_DAYS_SINCE_LAST_REQUEST as u32,
        }
    }
}

impl PolicyConfig {
    /// Build the policy these thresholds describe.
    ///
    /// Registration order matches [`ReviewConditionsBuilder::default_policy`].
    pub fn to_builder<S: TrackedSettings>(&self) -> ReviewConditionsBuilder<S> {
        let mut builder = ReviewConditionsBuilder::new();
        if self.minimum_primary_actions > 0 {
            builder = builder.minimum_primary_actions_completed(self.minimum_primary_actions);
        }
        if self.minimum_secondary_actions > 0 {
            builder = builder.minimum_secondary_actions_completed(self.minimum_secondary_actions);
        }
        if self.minimum_application_launches > 0 {
            builder = builder.minimum_application_launch_count(self.minimum_application_launches);
        }
        if self.minimum_days_since_first_launch > 0 {
            builder = builder.minimum_elapsed_since_first_launch(Duration::days(
                self.minimum_days_since_first_launch.into(),
            ));
        }
        if self.minimum_days_since_last_request > 0 {
            builder = builder.minimum_elapsed_since_last_request(Duration::days(
                self.minimum_days_since_last_request.into(),
            ));
        }
        builder
    }
}

/// Review configuration.
///
/// Serialized to/from TOML at `~/.config/review-prompt/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewConfig {
    #[serde(default)]
    pub policy: PolicyConfig,
    /// Tracked settings file; defaults to `review_settings.toml` in the
    /// data directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings_file: Option<PathBuf>,
}

impl ReviewConfig {
    /// Default configuration file location.
    pub fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()
            .map_err(|e| ConfigError::DataDir(e.to_string()))?
            .join(CONFIG_FILE_NAME))
    }

    /// Load from the default location, or return defaults if absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be read or parsed.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Persist to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };

        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| save_failed(e.to_string()))?;
        }
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    /// Where the tracked settings live.
    pub fn settings_path(&self) -> Result<PathBuf, ConfigError> {
        match &self.settings_file {
            Some(path) => Ok(path.clone()),
            None => Ok(data_dir()
                .map_err(|e| ConfigError::DataDir(e.to_string()))?
                .join(SETTINGS_FILE_NAME)),
        }
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let value = match key {
            "policy.minimum_primary_actions" => self.policy.minimum_primary_actions,
            "policy.minimum_secondary_actions" => self.policy.minimum_secondary_actions,
            "policy.minimum_application_launches" => self.policy.minimum_application_launches,
            "policy.minimum_days_since_first_launch" => self.policy.minimum_days_since_first_launch,
            "policy.minimum_days_since_last_request" => self.policy.minimum_days_since_last_request,
            "settings_file" => {
                return self
                    .settings_file
                    .as_ref()
                    .map(|p| p.display().to_string());
            }
            _ => return None,
        };
        Some(value.to_string())
    }

    /// Set a config value by dot-separated key.
    ///
    /// An empty value clears `settings_file`.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value cannot be parsed.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };
        let threshold = || value.trim().parse::<u32>().map_err(|e| invalid(e.to_string()));

        match key {
            "policy.minimum_primary_actions" => self.policy.minimum_primary_actions = threshold()?,
            "policy.minimum_secondary_actions" => {
                self.policy.minimum_secondary_actions = threshold()?
            }
            "policy.minimum_application_launches" => {
                self.policy.minimum_application_launches = threshold()?
            }
            "policy.minimum_days_since_first_launch" => {
                self.policy.minimum_days_since_first_launch = threshold()?
            }
            "policy.minimum_days_since_last_request" => {
                self.policy.minimum_days_since_last_request = threshold()?
            }
            "settings_file" => {
                self.settings_file = if value.is_empty() {
                    None
                } else {
                    Some(PathBuf::from(value))
                };
            }
            _ => return Err(invalid("unknown config key".to_string())),
        }
        Ok(())
    }
}
