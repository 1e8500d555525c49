//! Flotilla - a feature-branch coordinator for multi-repository .NET
//! workspaces.
//!
//! This crate provides the core library functionality for Flotilla:
//! workspace configuration, repository setup, and the override-graph
//! builder that reroutes package references to in-progress sibling
//! source without touching original project or solution files.

pub mod core;
pub mod dotnet;
pub mod git;
pub mod ops;
pub mod util;

/// Test utilities and fakes for Flotilla unit tests.
///
/// This module is only available when running tests. It provides a
/// deterministic [`util::process::CommandRunner`] fake with canned
/// outputs and call recording.
#[cfg(test)]
pub mod test_support;

pub use core::workspace::{Repository, Workspace, WorkspaceError};
pub use git::GitCli;
pub use util::config::Config;
pub use util::process::{CommandRunner, ProcessBuilder, ProcessOutput, SystemRunner};
