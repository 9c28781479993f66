//! import command - Import a mesh file and export the store

use std::path::Path;

use super::load_config;
use crate::cli::output::{print_diagnostics, print_json};
use crate::core::path::DataPath;
use crate::core::store::DataStructure;
use crate::engine::{Context, Pipeline, PipelineStep};
use crate::filter::{Arguments, ExecutionContext};
use crate::filters::{ExportStore, ImportGeometryFromFile};
use anyhow::{bail, Result};

/// Import `input` into an empty store and write the store to `output`.
pub fn import(
    ctx: &Context,
    input: &Path,
    output: &Path,
    geometry_path: &str,
    scale: Option<f64>,
    no_xdmf: bool,
    json: bool,
) -> Result<()> {
    let config = load_config(ctx)?;
    let input = ctx.resolve(input)?;
    let output = ctx.resolve(output)?;

    let mut import_args = Arguments::new()
        .with("file_path", input.as_path())
        .with("geometry_path", geometry_path);
    if let Some(factor) = scale {
        import_args.insert("scale_factor", factor);
        import_args.insert("apply_scale", true);
    }
    let export_args = Arguments::new()
        .with("destination", output.as_path())
        .with("write_auxiliary", !no_xdmf && config.write_auxiliary());

    let mut pipeline = Pipeline::new("import")
        .with_step(PipelineStep::new(ImportGeometryFromFile, import_args))
        .with_step(PipelineStep::new(ExportStore, export_args));

    let mut store = DataStructure::new();
    let report = pipeline.run(&mut store, &ExecutionContext::new());

    if json {
        print_json(&report.result)?;
    } else {
        print_diagnostics(&report.result, ctx.quiet);
    }
    if report.result.has_errors() {
        bail!("import failed: {}", report.result.summary());
    }

    if !json && !ctx.quiet {
        let geometry = DataPath::parse(geometry_path)
            .ok()
            .and_then(|path| store.get(&path).and_then(|o| o.as_geometry()).cloned());
        match geometry {
            Some(g) => println!(
                "Wrote {} ({} vertices, {} faces)",
                output.display(),
                g.vertex_count(),
                g.face_count()
            ),
            None => println!("Wrote {}", output.display()),
        }
    }
    Ok(())
}
