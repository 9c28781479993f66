//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Validates command-specific arguments
//! 2. Builds filters or pipelines and hands them to the engine
//! 3. Formats and displays output
//!
//! Handlers never modify a store directly.

mod completion;
mod config_cmd;
mod filters;
mod import;
mod inspect;
mod preflight;
mod run;

// Re-export command functions for testing and direct invocation
pub use completion::completion;
pub use config_cmd::{get as config_get, list as config_list, set as config_set};
pub use filters::filters;
pub use import::import;
pub use inspect::inspect;
pub use preflight::preflight;
pub use run::run;

use std::path::Path;

use crate::cli::args::{Command, ConfigAction};
use crate::codec::container;
use crate::core::config::Config;
use crate::core::store::DataStructure;
use crate::engine::{Context, FailurePolicy, Pipeline, PipelineFile};
use crate::filter::FilterRegistry;
use anyhow::{Context as _, Result};

/// Dispatch a command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    match command {
        Command::Import {
            input,
            output,
            geometry_path,
            scale,
            no_xdmf,
            json,
        } => import::import(ctx, &input, &output, &geometry_path, scale, no_xdmf, json),
        Command::Run {
            pipeline,
            policy,
            input,
            output,
            json,
        } => run::run(
            ctx,
            &pipeline,
            policy.as_deref(),
            input.as_deref(),
            output.as_deref(),
            json,
        ),
        Command::Preflight {
            pipeline,
            input,
            json,
        } => preflight::preflight(ctx, &pipeline, input.as_deref(), json),
        Command::Inspect { file, header, json } => inspect::inspect(ctx, &file, header, json),
        Command::Filters { filter, json } => filters::filters(ctx, filter.as_deref(), json),
        Command::Config { action } => match action {
            ConfigAction::Get { key } => config_cmd::get(ctx, &key),
            ConfigAction::Set {
                key,
                value,
                project,
            } => config_cmd::set(ctx, &key, &value, project),
            ConfigAction::List => config_cmd::list(ctx),
        },
        Command::Completion { shell } => completion::completion(shell),
    }
}

/// Load configuration for the context's working directory.
fn load_config(ctx: &Context) -> Result<Config> {
    let dir = ctx
        .working_dir()
        .context("Failed to determine working directory")?;
    Ok(Config::load(Some(&dir))
        .context("Failed to load config")?
        .config)
}

/// Decode a container file into a store.
fn load_store(ctx: &Context, path: &Path) -> Result<DataStructure> {
    let path = ctx.resolve(path)?;
    let bytes = std::fs::read(&path).with_context(|| format!("Failed to read {}", path.display()))?;
    container::decode(&bytes).with_context(|| format!("Failed to decode {}", path.display()))
}

/// Load a pipeline file and apply the policy precedence:
/// `--policy`, then the file, then config, then `halt_on_error`.
fn load_pipeline(ctx: &Context, path: &Path, policy: Option<&str>) -> Result<Pipeline> {
    let path = ctx.resolve(path)?;
    let file = PipelineFile::load(&path)?;
    let mut pipeline = file.to_pipeline(&FilterRegistry::with_builtin())?;

    pipeline.policy = match (policy, file.failure_policy) {
        (Some(flag), _) => flag.parse::<FailurePolicy>().map_err(anyhow::Error::msg)?,
        (None, Some(from_file)) => from_file,
        (None, None) => load_config(ctx)?
            .failure_policy()
            .parse::<FailurePolicy>()
            .map_err(anyhow::Error::msg)?,
    };
    Ok(pipeline)
}
