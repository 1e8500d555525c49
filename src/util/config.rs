//! Configuration file support for Flotilla.
//!
//! Flotilla reads a single TOML file describing the workspace:
//! - Project-local: `./flotilla.toml` (takes precedence)
//! - Global: `~/.flotilla/config.toml`
//!
//! The file names the root directory, the repository list, and the
//! test-suppression flag. It is loaded once at process start.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::workspace::{Repository, Workspace, WorkspaceError};

/// File name of the project-local configuration.
pub const CONFIG_FILE: &str = "flotilla.toml";

/// Workspace configuration as written by the user.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root directory under which feature directories are created.
    pub root: PathBuf,

    /// Strip test projects after the override graph is built.
    pub disable_unit_tests: bool,

    /// Ordered repository list.
    pub repositories: Vec<Repository>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if the file doesn't
    /// exist or fails to parse.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("failed to load config from {}: {}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Validate the configuration into an immutable [`Workspace`].
    pub fn into_workspace(self) -> Result<Workspace, WorkspaceError> {
        Workspace::new(self.root, self.disable_unit_tests, self.repositories)
    }
}

/// Get the global flotilla config directory (~/.flotilla).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".flotilla"))
}

/// Get the global config path (~/.flotilla/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Resolve the configuration file to use.
///
/// Order of precedence (highest to lowest):
/// 1. Explicit `--config` path
/// 2. `./flotilla.toml` in the current directory
/// 3. `~/.flotilla/config.toml`
pub fn resolve_config_path(explicit: Option<&Path>, cwd: &Path) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }

    let local = cwd.join(CONFIG_FILE);
    if local.exists() {
        return Ok(local);
    }

    if let Some(global) = global_config_path() {
        if global.exists() {
            return Ok(global);
        }
    }

    anyhow::bail!(
        "no configuration found: expected `{}` in the current directory \
         or `~/.flotilla/config.toml`",
        CONFIG_FILE
    )
}
