//! engine::runner
//!
//! Runs pipelines and reports the outcome.
//!
//! # Failure policy
//!
//! - [`FailurePolicy::HaltOnError`]: the first step that reports an error
//!   fails the run; later steps are not run
//! - [`FailurePolicy::ContinueOnError`]: every enabled step runs; errors
//!   accumulate and the run still completes
//!
//! There is no rollback across steps: effects of steps that succeeded stay
//! in the store when a later step fails. Within a step, changes are
//! all-or-nothing.
//!
//! Cancellation is checked before each step and stops the run as
//! [`RunState::Failed`] with a `Cancelled` diagnostic, whatever the policy.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::pipeline::Pipeline;
use crate::core::store::DataStructure;
use crate::filter::changes::apply_declared;
use crate::filter::result::{DiagnosticCode, ExecutionResult};
use crate::filter::ExecutionContext;

/// What to do when a step reports errors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    #[default]
    HaltOnError,
    ContinueOnError,
}

impl FailurePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailurePolicy::HaltOnError => "halt_on_error",
            FailurePolicy::ContinueOnError => "continue_on_error",
        }
    }
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for FailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "halt_on_error" => Ok(FailurePolicy::HaltOnError),
            "continue_on_error" => Ok(FailurePolicy::ContinueOnError),
            other => Err(format!("unknown failure policy '{}'", other)),
        }
    }
}

/// Lifecycle of a pipeline run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    #[default]
    Idle,
    Running,
    Completed,
    Failed,
}

/// What happened to one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Executed,
    /// The step is disabled.
    Skipped,
    /// The run stopped before reaching the step.
    NotRun,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepReport {
    pub index: usize,
    pub filter: String,
    pub label: String,
    pub status: StepStatus,
    pub result: ExecutionResult,
}

/// Outcome of [`Pipeline::run`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub state: RunState,
    /// All diagnostics of the run, in step order.
    pub result: ExecutionResult,
    pub steps: Vec<StepReport>,
}

impl RunReport {
    pub fn succeeded(&self) -> bool {
        self.state == RunState::Completed && !self.result.has_errors()
    }
}

/// Outcome of [`Pipeline::preflight`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreflightReport {
    pub result: ExecutionResult,
    pub steps: Vec<StepReport>,
}

impl PreflightReport {
    pub fn is_valid(&self) -> bool {
        !self.result.has_errors()
    }
}

pub(crate) fn run(pipeline: &Pipeline, store: &mut DataStructure, ctx: &ExecutionContext) -> RunReport {
    log::debug!(
        "running pipeline '{}' ({} step(s), {})",
        pipeline.name,
        pipeline.steps.len(),
        pipeline.policy
    );

    let mut result = ExecutionResult::new();
    let mut steps = Vec::with_capacity(pipeline.steps.len());
    let mut state = RunState::Completed;

    for (index, step) in pipeline.steps.iter().enumerate() {
        let mut report = StepReport {
            index,
            filter: step.filter.name().to_string(),
            label: step.display_name(),
            status: StepStatus::NotRun,
            result: ExecutionResult::new(),
        };

        if state == RunState::Failed {
            steps.push(report);
            continue;
        }
        if !step.enabled {
            log::debug!("step {} ({}) skipped", index, report.filter);
            report.status = StepStatus::Skipped;
            steps.push(report);
            continue;
        }
        if ctx.is_cancelled() {
            log::debug!("pipeline '{}' cancelled before step {}", pipeline.name, index);
            result.push_error(
                DiagnosticCode::Cancelled,
                format!("run cancelled before step {} ({})", index, report.label),
            );
            state = RunState::Failed;
            steps.push(report);
            continue;
        }

        log::debug!("step {} ({}) starting", index, report.filter);
        ctx.progress(step.filter.name(), &format!("step {} of {}", index + 1, pipeline.steps.len()));
        let step_result = step.filter.execute_with(store, &step.arguments, ctx);
        log::debug!("step {} ({}) finished: {}", index, report.filter, step_result.summary());

        if step_result.has_errors() && pipeline.policy == FailurePolicy::HaltOnError {
            state = RunState::Failed;
        }
        result.extend(step_result.clone());
        report.status = StepStatus::Executed;
        report.result = step_result;
        steps.push(report);
    }

    log::debug!("pipeline '{}' {:?}: {}", pipeline.name, state, result.summary());
    RunReport {
        state,
        result,
        steps,
    }
}

pub(crate) fn preflight(pipeline: &Pipeline, store: &DataStructure) -> PreflightReport {
    let mut scratch = store.clone();
    let mut result = ExecutionResult::new();
    let mut steps = Vec::with_capacity(pipeline.steps.len());

    for (index, step) in pipeline.steps.iter().enumerate() {
        let name = step.filter.name();
        let mut report = StepReport {
            index,
            filter: name.to_string(),
            label: step.display_name(),
            status: StepStatus::Skipped,
            result: ExecutionResult::new(),
        };
        if step.enabled {
            let declared = step.filter.declare(&scratch, &step.arguments);
            let mut step_result = declared.result;
            if !step_result.has_errors() {
                step_result.extend(apply_declared(&mut scratch, &declared.actions).with_filter(name));
            }
            report.status = StepStatus::Executed;
            report.result = step_result.clone();
            result.extend(step_result);
        }
        steps.push(report);
    }

    PreflightReport { result, steps }
}
