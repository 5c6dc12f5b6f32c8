//! Command-line interface definition

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "launchpad",
    about = "Build-and-deploy resilience pipeline for generated static sites",
    version
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args)]
pub struct GlobalArgs {
    /// Emit machine-readable JSON instead of styled output
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbose diagnostics (raises the log filter and prints debug events)
    #[arg(long, global = true)]
    pub debug: bool,

    /// Optional TOML file overriding the build configuration
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Workspace base directory (defaults to <tmp>/launchpad-builds)
    #[arg(long, global = true, value_name = "DIR")]
    pub base_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build a project directory into a deployable artifact set
    Build {
        /// Directory holding the generated project sources
        project_dir: PathBuf,

        /// Project slug used to name the workspace
        #[arg(long)]
        slug: String,
    },

    /// Run the workspace retention sweep
    Prune {
        /// Number of most-recent workspaces to keep
        #[arg(long, default_value_t = launchpad_workspace::DEFAULT_RETAIN)]
        keep: usize,
    },

    /// Remove one workspace directory (post-deploy cleanup)
    Clean {
        /// Workspace path as reported in the build result
        workspace: PathBuf,
    },

    /// Classify an error message against the failure taxonomy
    Classify {
        /// Raw error text, quoted
        message: String,
    },
}
