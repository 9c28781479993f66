//! engine::pipeline
//!
//! An ordered list of configured filter invocations.
//!
//! # Example
//!
//! ```no_run
//! use meshpipe::core::store::DataStructure;
//! use meshpipe::engine::{Pipeline, PipelineStep, RunState};
//! use meshpipe::filter::{Arguments, ExecutionContext};
//! use meshpipe::filters::{ExportStore, ImportGeometryFromFile};
//!
//! let mut pipeline = Pipeline::new("stl to container")
//!     .with_step(PipelineStep::new(
//!         ImportGeometryFromFile,
//!         Arguments::new()
//!             .with("file_path", "cube.stl")
//!             .with("geometry_path", "Cube"),
//!     ))
//!     .with_step(PipelineStep::new(
//!         ExportStore,
//!         Arguments::new().with("destination", "cube.mpc"),
//!     ));
//!
//! let mut store = DataStructure::new();
//! let report = pipeline.run(&mut store, &ExecutionContext::new());
//! assert_eq!(report.state, RunState::Completed);
//! ```

use std::fmt;
use std::sync::Arc;

use super::runner::{self, FailurePolicy, PreflightReport, RunReport, RunState};
use crate::core::store::DataStructure;
use crate::filter::{Arguments, ExecutionContext, Filter};

/// One configured filter invocation.
#[derive(Clone)]
pub struct PipelineStep {
    pub filter: Arc<dyn Filter>,
    pub arguments: Arguments,
    /// Disabled steps are reported as skipped and never run.
    pub enabled: bool,
    pub label: Option<String>,
}

impl PipelineStep {
    pub fn new(filter: impl Filter + 'static, arguments: Arguments) -> Self {
        Self::from_arc(Arc::new(filter), arguments)
    }

    pub fn from_arc(filter: Arc<dyn Filter>, arguments: Arguments) -> Self {
        Self {
            filter,
            arguments,
            enabled: true,
            label: None,
        }
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Label if set, otherwise the filter's human-readable name.
    pub fn display_name(&self) -> String {
        self.label
            .clone()
            .unwrap_or_else(|| self.filter.metadata().human_name.to_string())
    }
}

impl fmt::Debug for PipelineStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineStep")
            .field("filter", &self.filter.name())
            .field("arguments", &self.arguments)
            .field("enabled", &self.enabled)
            .field("label", &self.label)
            .finish()
    }
}

/// An ordered sequence of steps run against one store.
#[derive(Debug, Clone)]
pub struct Pipeline {
    pub name: String,
    pub steps: Vec<PipelineStep>,
    pub policy: FailurePolicy,
    state: RunState,
}

impl Pipeline {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            steps: Vec::new(),
            policy: FailurePolicy::default(),
            state: RunState::Idle,
        }
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_step(mut self, step: PipelineStep) -> Self {
        self.steps.push(step);
        self
    }

    pub fn push(&mut self, step: PipelineStep) {
        self.steps.push(step);
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// State after the most recent run (`Idle` before the first).
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Run every enabled step in order against `store`.
    ///
    /// Steps that succeed keep their effects even if a later step fails.
    pub fn run(&mut self, store: &mut DataStructure, ctx: &ExecutionContext) -> RunReport {
        self.state = RunState::Running;
        let report = runner::run(self, store, ctx);
        self.state = report.state;
        report
    }

    /// Preflight every enabled step without touching `store`.
    ///
    /// Steps are checked against a scratch copy of the store onto which
    /// the outputs declared by earlier steps have been applied, so a step
    /// may consume what an earlier step will create.
    pub fn preflight(&self, store: &DataStructure) -> PreflightReport {
        runner::preflight(self, store)
    }
}
