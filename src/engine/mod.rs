//! engine
//!
//! Runs ordered sequences of filters against a single store.
//!
//! # Lifecycle
//!
//! ```text
//! Idle -> Running -> Completed | Failed
//! ```
//!
//! Each step goes through the filter's own bind -> preflight -> execute ->
//! commit cycle (see [`crate::filter`]). The [`FailurePolicy`] decides
//! whether an erroring step stops the run.
//!
//! # Invariants
//!
//! - Steps run in order, one at a time, against the same store
//! - A step's changes are committed all-or-nothing
//! - Earlier steps are never rolled back when a later step fails
//! - [`Pipeline::preflight`] never modifies the caller's store

pub mod file;
pub mod pipeline;
pub mod runner;

use std::path::PathBuf;

pub use file::{PipelineFile, PipelineFileError, StepEntry};
pub use pipeline::{Pipeline, PipelineStep};
pub use runner::{FailurePolicy, PreflightReport, RunReport, RunState, StepReport, StepStatus};

/// Options shared by CLI command handlers.
#[derive(Debug, Clone, Default)]
pub struct Context {
    /// Directory to treat as the working directory.
    pub cwd: Option<PathBuf>,
    /// Enable debug output.
    pub debug: bool,
    /// Minimal output.
    pub quiet: bool,
}

impl Context {
    /// The effective working directory.
    pub fn working_dir(&self) -> std::io::Result<PathBuf> {
        match &self.cwd {
            Some(dir) => Ok(dir.clone()),
            None => std::env::current_dir(),
        }
    }

    /// Resolve `path` against [`Context::working_dir`] unless absolute.
    pub fn resolve(&self, path: &std::path::Path) -> std::io::Result<PathBuf> {
        if path.is_absolute() {
            Ok(path.to_path_buf())
        } else {
            Ok(self.working_dir()?.join(path))
        }
    }
}
