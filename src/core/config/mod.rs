//! core::config
//!
//! Configuration schema and loading.
//!
//! # Overview
//!
//! meshpipe has two configuration scopes:
//! - **Global**: User-level settings
//! - **Project**: Overrides for the current working directory
//!
//! # Precedence
//!
//! Configuration values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Global config file
//! 3. Project config file
//! 4. CLI flags (not handled here)
//!
//! # Global Config Locations
//!
//! Searched in order:
//! 1. `$MESHPIPE_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/meshpipe/config.toml`
//! 3. `~/.meshpipe/config.toml` (canonical write location)
//!
//! # Project Config Location
//!
//! `.meshpipe.toml` in the project directory.
//!
//! # Example
//!
//! ```no_run
//! use meshpipe::core::config::Config;
//! use std::path::Path;
//!
//! let result = Config::load(Some(Path::new("."))).unwrap();
//! let config = result.config;
//! println!("failure policy: {}", config.failure_policy());
//! println!("write XDMF: {}", config.write_auxiliary());
//! ```

pub mod schema;

pub use schema::ConfigFile;

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::core::fsio;

/// File name of the project config.
pub const PROJECT_FILE: &str = ".meshpipe.toml";

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("failed to write config file '{path}': {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config value: {0}")]
    InvalidValue(String),

    #[error("unknown configuration key: {0}")]
    UnknownKey(String),

    #[error("home directory not found")]
    NoHomeDir,
}

/// Result of loading configuration.
#[derive(Debug)]
pub struct ConfigLoadResult {
    pub config: Config,
}

/// Merged configuration from all sources.
///
/// Accessors apply precedence rules: project config overrides global config.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub global: ConfigFile,
    pub project: Option<ConfigFile>,
    global_path: Option<PathBuf>,
    project_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from default locations.
    ///
    /// If `project_dir` is provided, also loads `<project_dir>/.meshpipe.toml`.
    ///
    /// # Errors
    ///
    /// Returns an error if config files exist but cannot be parsed or hold
    /// invalid values. Missing config files are not an error.
    pub fn load(project_dir: Option<&Path>) -> Result<ConfigLoadResult, ConfigError> {
        let (global, global_path) = Self::load_global()?;

        let (project, project_path) = match project_dir {
            Some(dir) => {
                let path = Self::project_config_path(dir);
                if path.exists() {
                    (Some(Self::read_config(&path)?), Some(path))
                } else {
                    (None, None)
                }
            }
            None => (None, None),
        };

        global.validate()?;
        if let Some(ref p) = project {
            p.validate()?;
        }

        log::debug!(
            "config loaded (global: {:?}, project: {:?})",
            global_path,
            project_path
        );

        Ok(ConfigLoadResult {
            config: Config {
                global,
                project,
                global_path,
                project_path,
            },
        })
    }

    fn load_global() -> Result<(ConfigFile, Option<PathBuf>), ConfigError> {
        for path in Self::global_candidates() {
            if path.exists() {
                let config = Self::read_config(&path)?;
                return Ok((config, Some(path)));
            }
        }
        Ok((ConfigFile::default(), None))
    }

    /// Global config locations in search order.
    fn global_candidates() -> Vec<PathBuf> {
        let mut candidates = Vec::new();
        if let Ok(path) = std::env::var("MESHPIPE_CONFIG") {
            candidates.push(PathBuf::from(path));
        }
        if let Ok(xdg_home) = std::env::var("XDG_CONFIG_HOME") {
            candidates.push(PathBuf::from(xdg_home).join("meshpipe/config.toml"));
        }
        if let Some(home) = dirs::home_dir() {
            candidates.push(home.join(".meshpipe/config.toml"));
        }
        candidates
    }

    fn read_config(path: &Path) -> Result<ConfigFile, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Canonical path for global config.
    ///
    /// `$MESHPIPE_CONFIG` when set, otherwise `~/.meshpipe/config.toml`.
    pub fn global_config_path() -> Result<PathBuf, ConfigError> {
        if let Ok(path) = std::env::var("MESHPIPE_CONFIG") {
            return Ok(PathBuf::from(path));
        }
        let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
        Ok(home.join(".meshpipe/config.toml"))
    }

    pub fn project_config_path(project_dir: &Path) -> PathBuf {
        project_dir.join(PROJECT_FILE)
    }

    /// Write global config atomically, creating parent directories.
    pub fn write_global(config: &ConfigFile) -> Result<PathBuf, ConfigError> {
        let path = Self::global_config_path()?;
        Self::write_to(&path, config)?;
        Ok(path)
    }

    /// Write project config atomically.
    pub fn write_project(project_dir: &Path, config: &ConfigFile) -> Result<PathBuf, ConfigError> {
        let path = Self::project_config_path(project_dir);
        Self::write_to(&path, config)?;
        Ok(path)
    }

    /// Validate `config` and write it atomically to `path`.
    pub fn write_to(path: &Path, config: &ConfigFile) -> Result<(), ConfigError> {
        config.validate()?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError {
                    path: path.to_path_buf(),
                    source: e,
                })?;
            }
        }

        let contents =
            toml::to_string_pretty(config).map_err(|e| ConfigError::InvalidValue(e.to_string()))?;

        fsio::write_atomic(path, contents.as_bytes()).map_err(|e| ConfigError::WriteError {
            path: path.to_path_buf(),
            source: e,
        })
    }

    // =========================================================================
    // Accessor methods with precedence
    // =========================================================================

    /// Resolve a dotted key: project value, then global value.
    pub fn get(&self, key: &str) -> Result<Option<String>, ConfigError> {
        if let Some(project) = &self.project {
            if let Some(value) = project.get_key(key)? {
                return Ok(Some(value));
            }
        }
        self.global.get_key(key)
    }

    /// Failure policy name.
    ///
    /// Defaults to "halt_on_error".
    pub fn failure_policy(&self) -> &str {
        self.project
            .as_ref()
            .and_then(|p| p.pipeline.as_ref())
            .and_then(|p| p.failure_policy.as_deref())
            .or_else(|| {
                self.global
                    .pipeline
                    .as_ref()
                    .and_then(|p| p.failure_policy.as_deref())
            })
            .unwrap_or("halt_on_error")
    }

    /// Whether export writes the XDMF sibling by default.
    ///
    /// Defaults to `true`.
    pub fn write_auxiliary(&self) -> bool {
        self.project
            .as_ref()
            .and_then(|p| p.export.as_ref())
            .and_then(|e| e.write_auxiliary)
            .or_else(|| self.global.export.as_ref().and_then(|e| e.write_auxiliary))
            .unwrap_or(true)
    }

    /// Configured log level, if any.
    pub fn log_level(&self) -> Option<&str> {
        self.project
            .as_ref()
            .and_then(|p| p.log.as_ref())
            .and_then(|l| l.level.as_deref())
            .or_else(|| self.global.log.as_ref().and_then(|l| l.level.as_deref()))
    }

    pub fn global_config_loaded_from(&self) -> Option<&Path> {
        self.global_path.as_deref()
    }

    pub fn project_config_loaded_from(&self) -> Option<&Path> {
        self.project_path.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn load_project_config() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join(PROJECT_FILE),
            r#"
            [pipeline]
            failure_policy = "continue_on_error"

            [export]
            write_auxiliary = false
            "#,
        )
        .unwrap();

        let result = Config::load(Some(temp.path())).unwrap();
        let config = result.config;
        assert_eq!(config.failure_policy(), "continue_on_error");
        assert!(!config.write_auxiliary());
        assert_eq!(
            config.project_config_loaded_from(),
            Some(temp.path().join(PROJECT_FILE).as_path())
        );
    }

    #[test]
    fn invalid_project_value_rejected() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join(PROJECT_FILE),
            "[pipeline]\nfailure_policy = \"sometimes\"\n",
        )
        .unwrap();
        assert!(matches!(
            Config::load(Some(temp.path())),
            Err(ConfigError::InvalidValue(_))
        ));
    }

    #[test]
    fn unknown_fields_rejected() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(PROJECT_FILE), "verbose = true\n").unwrap();
        assert!(matches!(
            Config::load(Some(temp.path())),
            Err(ConfigError::ParseError { .. })
        ));
    }

    #[test]
    fn write_project_config_atomic() {
        let temp = TempDir::new().unwrap();
        let mut file = ConfigFile::default();
        file.set_key("log.level", "warn").unwrap();

        let path = Config::write_project(temp.path(), &file).unwrap();
        assert!(path.exists());

        let loaded = Config::load(Some(temp.path())).unwrap();
        assert_eq!(loaded.config.log_level(), Some("warn"));
    }

    #[test]
    fn precedence_project_overrides_global() {
        let mut global = ConfigFile::default();
        global.set_key("export.write_auxiliary", "false").unwrap();
        global.set_key("log.level", "info").unwrap();
        let mut project = ConfigFile::default();
        project.set_key("export.write_auxiliary", "true").unwrap();

        let config = Config {
            global,
            project: Some(project),
            global_path: None,
            project_path: None,
        };

        assert!(config.write_auxiliary());
        assert_eq!(config.log_level(), Some("info"));
        assert_eq!(
            config.get("export.write_auxiliary").unwrap().as_deref(),
            Some("true")
        );
        assert_eq!(config.get("log.level").unwrap().as_deref(), Some("info"));
    }

    #[test]
    fn defaults_without_files() {
        let config = Config::default();
        assert_eq!(config.failure_policy(), "halt_on_error");
        assert!(config.write_auxiliary());
        assert!(config.log_level().is_none());
        assert_eq!(config.get("pipeline.failure_policy").unwrap(), None);
    }
}
