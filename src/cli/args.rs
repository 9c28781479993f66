//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--cwd <path>`: Resolve command-line paths relative to that directory
//! - `--debug`: Enable debug logging
//! - `--quiet` / `-q`: Minimal output

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// meshpipe - filter pipelines for triangle-mesh geometry
#[derive(Parser, Debug)]
#[command(name = "mpipe")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Resolve command-line paths relative to this directory
    #[arg(long, global = true)]
    pub cwd: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Import a mesh file and write it to a container
    #[command(
        name = "import",
        long_about = "Import a mesh file into a fresh store and export the store.\n\n\
            Reads an STL (ASCII or binary) or OFF file into a triangle geometry with \
            a vertex matrix, a face matrix and per-face normals, then writes the whole \
            store to a container file. An XDMF sibling is written next to the \
            container unless --no-xdmf is given or export.write_auxiliary is false.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Import a part and write part.mpc (+ part.mpc.xdmf)
    mpipe import part.stl -o part.mpc

    # Import millimetre data as metres
    mpipe import part.stl -o part.mpc --scale 0.001

    # Put the geometry somewhere other than /Geometry
    mpipe import part.stl -o part.mpc --geometry-path Parts/Bracket"
    )]
    Import {
        /// Mesh file to read
        input: PathBuf,

        /// Container file to write
        #[arg(short, long)]
        output: PathBuf,

        /// Data path of the new geometry
        #[arg(long, default_value = "Geometry")]
        geometry_path: String,

        /// Uniform scale applied to vertex coordinates
        #[arg(long)]
        scale: Option<f64>,

        /// Do not write the XDMF sibling file
        #[arg(long)]
        no_xdmf: bool,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run a pipeline file
    #[command(
        name = "run",
        long_about = "Run a pipeline file against a store.\n\n\
            The store starts empty, or is loaded from --input. Steps run in order. \
            With halt_on_error the first step that reports an error stops the run; \
            with continue_on_error every step runs and errors accumulate. Changes \
            made by steps that succeeded are kept either way.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Run a pipeline from an empty store
    mpipe run convert.json

    # Keep going past failing steps
    mpipe run convert.json --policy continue_on_error

    # Start from an existing container and save the final store
    mpipe run cleanup.json --input part.mpc --output cleaned.mpc"
    )]
    Run {
        /// Pipeline file (JSON)
        pipeline: PathBuf,

        /// Override the pipeline's failure policy
        #[arg(long, value_name = "POLICY")]
        policy: Option<String>,

        /// Container to load before the first step
        #[arg(long)]
        input: Option<PathBuf>,

        /// Write the final store to this container
        #[arg(long)]
        output: Option<PathBuf>,

        /// Print the run report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check a pipeline file without running it
    #[command(
        name = "preflight",
        long_about = "Preflight every step of a pipeline file.\n\n\
            Validates arguments and checks each step against the outputs declared \
            by the steps before it. Nothing is read beyond what preflight needs and \
            nothing is written.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Check a pipeline before a long run
    mpipe preflight convert.json

    # Check against an existing container
    mpipe preflight cleanup.json --input part.mpc"
    )]
    Preflight {
        /// Pipeline file (JSON)
        pipeline: PathBuf,

        /// Container to load as the starting store
        #[arg(long)]
        input: Option<PathBuf>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the contents of a container file
    #[command(
        name = "inspect",
        after_help = "\
WORKFLOW EXAMPLES:
    # Show the object tree
    mpipe inspect part.mpc

    # Only the header
    mpipe inspect part.mpc --header"
    )]
    Inspect {
        /// Container file
        file: PathBuf,

        /// Only print the header
        #[arg(long)]
        header: bool,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// List available filters or describe one
    #[command(
        name = "filters",
        after_help = "\
WORKFLOW EXAMPLES:
    # List all filters
    mpipe filters

    # Parameters of one filter
    mpipe filters import_geometry_from_file"
    )]
    Filters {
        /// Filter name or UUID to describe
        filter: Option<String>,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Get, set, or list configuration values
    #[command(
        name = "config",
        long_about = "Get, set, or list configuration values.\n\n\
            Global configuration lives in ~/.meshpipe/config.toml (or \
            $XDG_CONFIG_HOME/meshpipe/config.toml, or $MESHPIPE_CONFIG). A \
            .meshpipe.toml in the working directory overrides it.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Show effective configuration
    mpipe config list

    # Keep running pipelines past failing steps by default
    mpipe config set pipeline.failure_policy continue_on_error

    # Only for this project
    mpipe config set --project export.write_auxiliary false"
    )]
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completion scripts
    #[command(
        name = "completion",
        long_about = "Generate shell completion scripts for tab-completion.\n\n\
            Outputs a completion script for the specified shell. Add the output \
            to your shell's configuration to enable tab-completion for mpipe commands.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Bash (add to ~/.bashrc)
    mpipe completion bash >> ~/.bashrc

    # Zsh
    mpipe completion zsh > ~/.zfunc/_mpipe

    # Fish
    mpipe completion fish > ~/.config/fish/completions/mpipe.fish

    # PowerShell
    mpipe completion powershell >> $PROFILE"
    )]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Get a configuration value
    Get {
        /// Configuration key
        key: String,
    },
    /// Set a configuration value
    Set {
        /// Configuration key
        key: String,
        /// Value to set
        value: String,
        /// Write to the project file instead of the global one
        #[arg(long)]
        project: bool,
    },
    /// List all configuration values
    List,
}

/// Supported shells for completion.
#[derive(clap::ValueEnum, Clone, Copy, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}
