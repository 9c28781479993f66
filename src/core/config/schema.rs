//! core::config::schema
//!
//! Configuration schema types.
//!
//! Both scopes (global and project) share one file layout:
//!
//! ```toml
//! [pipeline]
//! failure_policy = "halt_on_error"
//!
//! [export]
//! write_auxiliary = true
//!
//! [log]
//! level = "info"
//! ```
//!
//! # Validation
//!
//! Config values are validated after parsing. Unknown keys are rejected at
//! parse time.

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Keys accepted by `mpipe config get|set`.
pub const KEYS: &[&str] = &["pipeline.failure_policy", "export.write_auxiliary", "log.level"];

/// Recognised values for `pipeline.failure_policy`.
pub const FAILURE_POLICIES: &[&str] = &["halt_on_error", "continue_on_error"];

/// Recognised values for `log.level`.
pub const LOG_LEVELS: &[&str] = &["off", "error", "warn", "info", "debug", "trace"];

/// Contents of one config file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub pipeline: Option<PipelineDefaults>,
    pub export: Option<ExportDefaults>,
    pub log: Option<LogConfig>,
}

/// Pipeline runner defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineDefaults {
    /// "halt_on_error" or "continue_on_error"
    pub failure_policy: Option<String>,
}

/// Store export defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ExportDefaults {
    /// Write the XDMF descriptor next to exported containers
    pub write_auxiliary: Option<bool>,
}

/// Logging settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    pub level: Option<String>,
}

impl ConfigFile {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(policy) = self.pipeline.as_ref().and_then(|p| p.failure_policy.as_ref()) {
            check_choice("pipeline.failure_policy", policy, FAILURE_POLICIES)?;
        }
        if let Some(level) = self.log.as_ref().and_then(|l| l.level.as_ref()) {
            check_choice("log.level", level, LOG_LEVELS)?;
        }
        Ok(())
    }

    /// Read a dotted key, or `None` if it is unset here.
    pub fn get_key(&self, key: &str) -> Result<Option<String>, ConfigError> {
        Ok(match key {
            "pipeline.failure_policy" => self
                .pipeline
                .as_ref()
                .and_then(|p| p.failure_policy.clone()),
            "export.write_auxiliary" => self
                .export
                .as_ref()
                .and_then(|e| e.write_auxiliary)
                .map(|b| b.to_string()),
            "log.level" => self.log.as_ref().and_then(|l| l.level.clone()),
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        })
    }

    /// Set a dotted key from its string form, validating the value.
    pub fn set_key(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        match key {
            "pipeline.failure_policy" => {
                check_choice(key, value, FAILURE_POLICIES)?;
                self.pipeline.get_or_insert_with(Default::default).failure_policy =
                    Some(value.to_string());
            }
            "export.write_auxiliary" => {
                let flag = value.parse::<bool>().map_err(|_| {
                    ConfigError::InvalidValue(format!(
                        "export.write_auxiliary must be true or false, got '{}'",
                        value
                    ))
                })?;
                self.export.get_or_insert_with(Default::default).write_auxiliary = Some(flag);
            }
            "log.level" => {
                check_choice(key, value, LOG_LEVELS)?;
                self.log.get_or_insert_with(Default::default).level = Some(value.to_string());
            }
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }
        Ok(())
    }
}

fn check_choice(key: &str, value: &str, allowed: &[&str]) -> Result<(), ConfigError> {
    if allowed.contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue(format!(
            "invalid {} '{}', must be one of: {}",
            key,
            value,
            allowed.join(", ")
        )))
    }
}
