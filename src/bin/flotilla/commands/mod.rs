//! Command implementations

use std::path::PathBuf;

use anyhow::{Context, Result};

use flotilla::core::workspace::Workspace;
use flotilla::util::config::{resolve_config_path, Config};

pub mod find;
pub mod finish;
pub mod push;
pub mod start;

/// Resolve and load the workspace configuration.
pub fn load_workspace(explicit: &Option<PathBuf>) -> Result<Workspace> {
    let cwd = std::env::current_dir().context("failed to determine current directory")?;
    let path = resolve_config_path(explicit.as_deref(), &cwd)?;
    let workspace = Config::load(&path)?
        .into_workspace()
        .with_context(|| format!("invalid workspace in {}", path.display()))?;
    Ok(workspace)
}

/// Current directory, for commands that operate on the enclosing repo.
pub fn current_dir() -> Result<PathBuf> {
    std::env::current_dir().context("failed to determine current directory")
}
