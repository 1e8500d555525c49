//! High-level operations.
//!
//! This module contains the implementation of Flotilla commands.

pub mod feature;
pub mod overrides;
pub mod rewrite;
pub mod suppress;

pub use feature::{
    build_overrides, find_feature, finish_feature, push_feature, start_feature, BASE_BRANCH,
};
pub use overrides::{add_project_reference, create_override};
pub use rewrite::SolutionRewriter;
pub use suppress::{suppress_project, suppress_tests, SUPPRESSION_MARKER};
