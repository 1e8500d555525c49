//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Flotilla - feature-branch coordination for multi-repo .NET workspaces
#[derive(Parser)]
#[command(name = "flotilla")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to the workspace configuration file
    #[arg(long, global = true, env = "FLOTILLA_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Set up every repository for a story and build the override graph
    Start(StartArgs),

    /// Revert the feature start marker in every repository
    Finish(FinishArgs),

    /// Push the feature branch of the enclosing repository
    Push,

    /// Report which repositories have a remote feature branch
    Find(FindArgs),
}

#[derive(Args)]
pub struct StartArgs {
    /// Story identifier (names the feature directory and branch)
    pub story_id: String,
}

#[derive(Args)]
pub struct FinishArgs {
    /// Story identifier
    pub story_id: String,
}

#[derive(Args)]
pub struct FindArgs {
    /// Story identifier
    pub story_id: String,
}
