//! Core data structures and path conventions.
//!
//! This module contains the foundational types used throughout Flotilla:
//! - Workspace and repository descriptors
//! - Path conventions for override artifacts and feature directories

pub mod paths;
pub mod workspace;

pub use workspace::{
    feature_branch, start_commit_message, Repository, Workspace, WorkspaceError,
};
