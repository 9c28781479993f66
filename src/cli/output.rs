//! cli::output
//!
//! Shared rendering of diagnostics and reports.

use crate::engine::{PreflightReport, RunReport, StepReport, StepStatus};
use crate::filter::ExecutionResult;
use anyhow::Result;
use serde::Serialize;

/// Print errors, then warnings. Warnings are dropped with `quiet`.
pub fn print_diagnostics(result: &ExecutionResult, quiet: bool) {
    for error in &result.errors {
        println!("error   {}", error);
    }
    if !quiet {
        for warning in &result.warnings {
            println!("warning {}", warning);
        }
    }
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn status_label(step: &StepReport) -> &'static str {
    match step.status {
        StepStatus::Executed if step.result.has_errors() => "failed",
        StepStatus::Executed => "ok",
        StepStatus::Skipped => "skipped",
        StepStatus::NotRun => "not run",
    }
}

fn print_steps(steps: &[StepReport], quiet: bool) {
    for step in steps {
        if !quiet {
            println!(
                "  {:>2}. {:<8} {} ({})",
                step.index + 1,
                status_label(step),
                step.label,
                step.filter
            );
        }
        for error in &step.result.errors {
            println!("      error   {}", error);
        }
        if !quiet {
            for warning in &step.result.warnings {
                println!("      warning {}", warning);
            }
        }
    }
}

pub fn print_run_report(name: &str, report: &RunReport, quiet: bool) {
    if !quiet {
        println!("Pipeline '{}'", name);
    }
    print_steps(&report.steps, quiet);
    // Errors raised outside any step (cancellation).
    let step_errors: usize = report.steps.iter().map(|s| s.result.errors.len()).sum();
    for error in report.result.errors.iter().skip(step_errors) {
        println!("error   {}", error);
    }
    if !quiet {
        println!("{:?}: {}", report.state, report.result.summary());
    }
}

pub fn print_preflight_report(name: &str, report: &PreflightReport, quiet: bool) {
    if !quiet {
        println!("Pipeline '{}'", name);
    }
    print_steps(&report.steps, quiet);
    if !quiet {
        let verdict = if report.is_valid() { "valid" } else { "invalid" };
        println!("{}: {}", verdict, report.result.summary());
    }
}
