//! Flotilla CLI - feature-branch coordination for multi-repo .NET workspaces

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    // Parse CLI
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("flotilla=debug")
    } else {
        EnvFilter::new("flotilla=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();

    // Execute command
    match cli.command {
        Commands::Start(args) => commands::start::execute(&cli.config, args),
        Commands::Finish(args) => commands::finish::execute(&cli.config, args),
        Commands::Push => commands::push::execute(),
        Commands::Find(args) => commands::find::execute(&cli.config, args),
    }
}
