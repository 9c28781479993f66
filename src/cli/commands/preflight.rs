//! preflight command - Check a pipeline file without running it

use std::path::Path;

use super::{load_pipeline, load_store};
use crate::cli::output::{print_json, print_preflight_report};
use crate::core::store::DataStructure;
use crate::engine::Context;
use anyhow::{bail, Result};

pub fn preflight(ctx: &Context, pipeline_path: &Path, input: Option<&Path>, json: bool) -> Result<()> {
    let pipeline = load_pipeline(ctx, pipeline_path, None)?;
    let store = match input {
        Some(path) => load_store(ctx, path)?,
        None => DataStructure::new(),
    };

    let report = pipeline.preflight(&store);
    if json {
        print_json(&report)?;
    } else {
        print_preflight_report(&pipeline.name, &report, ctx.quiet);
    }

    if !report.is_valid() {
        bail!("preflight failed: {}", report.result.summary());
    }
    Ok(())
}
