//! run command - Run a pipeline file

use std::path::Path;

use super::{load_pipeline, load_store};
use crate::cli::output::{print_json, print_run_report};
use crate::codec::container;
use crate::core::fsio::write_atomic;
use crate::core::store::DataStructure;
use crate::engine::{Context, RunState};
use crate::filter::ExecutionContext;
use anyhow::{bail, Context as _, Result};

pub fn run(
    ctx: &Context,
    pipeline_path: &Path,
    policy: Option<&str>,
    input: Option<&Path>,
    output: Option<&Path>,
    json: bool,
) -> Result<()> {
    let mut pipeline = load_pipeline(ctx, pipeline_path, policy)?;
    let mut store = match input {
        Some(path) => load_store(ctx, path)?,
        None => DataStructure::new(),
    };

    let quiet = ctx.quiet || json;
    let exec = ExecutionContext::new().with_progress(move |filter, message| {
        if !quiet {
            eprintln!("[{}] {}", filter, message);
        }
    });
    let report = pipeline.run(&mut store, &exec);

    if json {
        print_json(&report)?;
    } else {
        print_run_report(&pipeline.name, &report, ctx.quiet);
    }

    // The store is saved even after failures: completed steps are kept.
    if let Some(path) = output {
        let path = ctx.resolve(path)?;
        let bytes = container::encode(&store).context("Failed to encode store")?;
        write_atomic(&path, &bytes).with_context(|| format!("Failed to write {}", path.display()))?;
        if !json && !ctx.quiet {
            println!("Wrote {}", path.display());
        }
    }

    match report.state {
        RunState::Failed => bail!("pipeline '{}' failed: {}", pipeline.name, report.result.summary()),
        _ if report.result.has_errors() => bail!(
            "pipeline '{}' completed with errors: {}",
            pipeline.name,
            report.result.summary()
        ),
        _ => Ok(()),
    }
}
