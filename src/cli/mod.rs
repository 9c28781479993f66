//! cli
//!
//! Command-line interface layer for meshpipe.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Initialise logging
//! - Delegate to command handlers
//!
//! # Architecture
//!
//! The CLI layer is thin. It parses arguments via clap, builds filters and
//! pipelines, and hands them to [`crate::engine`]. Stores are only changed
//! through filters.

pub mod args;
pub mod commands;
mod output;

pub use args::{Cli, Shell};

use crate::core::config::Config;
use crate::engine;
use anyhow::Result;

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<()> {
    let cli = Cli::parse_args();

    let ctx = engine::Context {
        cwd: cli.cwd.clone(),
        debug: cli.debug,
        quiet: cli.quiet,
    };

    // A broken config file must not prevent logging; the command reports it.
    let config_level = ctx
        .working_dir()
        .ok()
        .and_then(|dir| Config::load(Some(&dir)).ok())
        .and_then(|loaded| loaded.config.log_level().map(str::to_string));
    init_logging(cli.debug, config_level.as_deref());

    commands::dispatch(cli.command, &ctx)
}

/// `--debug` wins, then `RUST_LOG`, then the configured level, then `warn`.
fn init_logging(debug: bool, config_level: Option<&str>) {
    let mut builder = env_logger::Builder::new();
    if debug {
        builder.filter_level(log::LevelFilter::Debug);
    } else if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    } else {
        builder.parse_filters(config_level.unwrap_or("warn"));
    }
    builder.format_timestamp(None);
    // Already initialised when called twice in one process.
    let _ = builder.try_init();
}
