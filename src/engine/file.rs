//! engine::file
//!
//! Pipeline files: a JSON description of a pipeline.
//!
//! ```json
//! {
//!   "name": "stl to container",
//!   "failure_policy": "halt_on_error",
//!   "steps": [
//!     { "filter": "import_geometry_from_file",
//!       "args": { "file_path": "cube.stl", "geometry_path": "Cube" } },
//!     { "filter": "export_store", "enabled": false,
//!       "args": { "destination": "cube.mpc" } }
//!   ]
//! }
//! ```
//!
//! `filter` is a filter name or UUID. File paths in `args` are used as
//! written, so relative paths resolve against the working directory of
//! the process running the pipeline.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::pipeline::{Pipeline, PipelineStep};
use super::runner::FailurePolicy;
use crate::core::fsio::write_atomic;
use crate::filter::{Arguments, FilterRegistry};

#[derive(Debug, Error)]
pub enum PipelineFileError {
    #[error("failed to read pipeline file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse pipeline file {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("failed to write pipeline file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("step {index}: unknown filter '{filter}'")]
    UnknownFilter { index: usize, filter: String },
}

fn default_enabled() -> bool {
    true
}

fn is_true(b: &bool) -> bool {
    *b
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StepEntry {
    pub filter: String,

    #[serde(default = "default_enabled", skip_serializing_if = "is_true")]
    pub enabled: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    #[serde(default)]
    pub args: Arguments,
}

/// Serialized form of a [`Pipeline`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineFile {
    pub name: String,

    /// Unset means the caller's default applies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_policy: Option<FailurePolicy>,

    #[serde(default)]
    pub steps: Vec<StepEntry>,
}

impl PipelineFile {
    pub fn load(path: &Path) -> Result<Self, PipelineFileError> {
        let contents = fs::read_to_string(path).map_err(|e| PipelineFileError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&contents).map_err(|message| PipelineFileError::Parse {
            path: path.to_path_buf(),
            message,
        })
    }

    pub fn parse(contents: &str) -> Result<Self, String> {
        serde_json::from_str(contents).map_err(|e| e.to_string())
    }

    /// Write the file atomically as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<(), PipelineFileError> {
        let write_err = |e| PipelineFileError::Write {
            path: path.to_path_buf(),
            source: e,
        };
        let mut json = serde_json::to_string_pretty(self)
            .map_err(|e| write_err(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))?;
        json.push('\n');
        write_atomic(path, json.as_bytes()).map_err(write_err)
    }

    pub fn from_pipeline(pipeline: &Pipeline) -> Self {
        Self {
            name: pipeline.name.clone(),
            failure_policy: Some(pipeline.policy),
            steps: pipeline
                .steps
                .iter()
                .map(|step| StepEntry {
                    filter: step.filter.name().to_string(),
                    enabled: step.enabled,
                    label: step.label.clone(),
                    args: step.arguments.clone(),
                })
                .collect(),
        }
    }

    /// Resolve every step's filter through `registry`.
    ///
    /// Arguments are not checked here; that is preflight's job.
    pub fn to_pipeline(&self, registry: &FilterRegistry) -> Result<Pipeline, PipelineFileError> {
        let mut pipeline =
            Pipeline::new(self.name.clone()).with_policy(self.failure_policy.unwrap_or_default());
        for (index, entry) in self.steps.iter().enumerate() {
            let filter = registry
                .resolve(&entry.filter)
                .ok_or_else(|| PipelineFileError::UnknownFilter {
                    index,
                    filter: entry.filter.clone(),
                })?;
            let mut step = PipelineStep::from_arc(filter, entry.args.clone());
            step.enabled = entry.enabled;
            step.label = entry.label.clone();
            pipeline.push(step);
        }
        Ok(pipeline)
    }
}
