//! Workspace model: the set of repositories that make up one feature.
//!
//! A [`Workspace`] is built once from configuration at process start and
//! is read-only for the rest of the run. Solutions and projects are never
//! modeled as long-lived objects; they are queried from the build tool on
//! demand because the ground truth lives in the tool's own resolution.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from workspace construction.
#[derive(Debug, Error)]
pub enum WorkspaceError {
    /// Two repositories publish the same package identity.
    #[error("duplicate package identity `{identity}` (repositories `{first}` and `{second}`)")]
    DuplicatePackageIdentity {
        identity: String,
        first: String,
        second: String,
    },

    /// The repository list is empty.
    #[error("workspace has no repositories configured")]
    NoRepositories,
}

/// One source repository participating in the workspace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Repository {
    /// Path of the clone, relative to the feature directory.
    pub path: String,

    /// Remote URL used for cloning.
    pub remote_url: String,

    /// Identity this repository publishes as a package.
    pub package_identity: String,

    /// Whether sibling projects may reroute a package dependency on this
    /// identity to the repository's in-progress source.
    #[serde(default)]
    pub package_backed: bool,
}

/// The per-run workspace: root directory plus the ordered repository set.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
    disable_unit_tests: bool,
    repositories: Vec<Repository>,
}

impl Workspace {
    /// Build a workspace, enforcing the package-identity uniqueness
    /// invariant. Repository order is preserved; the rewriter checks
    /// candidate identities in this declared order.
    pub fn new(
        root: impl Into<PathBuf>,
        disable_unit_tests: bool,
        repositories: Vec<Repository>,
    ) -> Result<Self, WorkspaceError> {
        if repositories.is_empty() {
            return Err(WorkspaceError::NoRepositories);
        }

        for (i, repo) in repositories.iter().enumerate() {
            if let Some(dup) = repositories[..i]
                .iter()
                .find(|r| r.package_identity == repo.package_identity)
            {
                return Err(WorkspaceError::DuplicatePackageIdentity {
                    identity: repo.package_identity.clone(),
                    first: dup.path.clone(),
                    second: repo.path.clone(),
                });
            }
        }

        Ok(Workspace {
            root: root.into(),
            disable_unit_tests,
            repositories,
        })
    }

    /// Root directory under which feature directories are created.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether test projects are stripped after the override graph is built.
    pub fn disable_unit_tests(&self) -> bool {
        self.disable_unit_tests
    }

    /// All repositories, in declared order.
    pub fn repositories(&self) -> &[Repository] {
        &self.repositories
    }

    /// Repositories eligible as override targets, in declared order.
    pub fn package_backed(&self) -> impl Iterator<Item = &Repository> {
        self.repositories.iter().filter(|r| r.package_backed)
    }

    /// Every package identity known to the workspace, in declared order.
    ///
    /// The synthesizer declares removal of all of these in each override
    /// project; removing an identity the project never referenced is a
    /// no-op for the build tool.
    pub fn package_identities(&self) -> Vec<&str> {
        self.repositories
            .iter()
            .map(|r| r.package_identity.as_str())
            .collect()
    }

    /// Directory holding all clones for one story.
    pub fn feature_dir(&self, story_id: &str) -> PathBuf {
        self.root.join(story_id)
    }

    /// Clone directory of one repository within a feature.
    pub fn repo_dir(&self, story_id: &str, repo: &Repository) -> PathBuf {
        self.feature_dir(story_id).join(&repo.path)
    }
}

/// Branch name used for a story's feature branch.
pub fn feature_branch(story_id: &str) -> String {
    format!("feature/story-{}", story_id)
}

/// Commit message marking the start of a feature in each repository.
///
/// `finish` later locates this commit by exact message match and reverts
/// it.
pub fn start_commit_message(story_id: &str) -> String {
    format!("{} start", feature_branch(story_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo(path: &str, identity: &str, backed: bool) -> Repository {
        Repository {
            path: path.to_string(),
            remote_url: format!("https://example.com/{}", path),
            package_identity: identity.to_string(),
            package_backed: backed,
        }
    }

    #[test]
    fn test_workspace_rejects_duplicate_identity() {
        let err = Workspace::new(
            "/work",
            false,
            vec![repo("a", "Acme.Contracts", true), repo("b", "Acme.Contracts", false)],
        )
        .unwrap_err();

        assert!(matches!(
            err,
            WorkspaceError::DuplicatePackageIdentity { .. }
        ));
    }

    #[test]
    fn test_workspace_rejects_empty() {
        assert!(matches!(
            Workspace::new("/work", false, vec![]),
            Err(WorkspaceError::NoRepositories)
        ));
    }

    #[test]
    fn test_package_backed_preserves_order() {
        let ws = Workspace::new(
            "/work",
            false,
            vec![
                repo("app", "Acme.App", false),
                repo("contracts", "Acme.Contracts", true),
                repo("core", "Acme.Core", true),
            ],
        )
        .unwrap();

        let backed: Vec<_> = ws.package_backed().map(|r| r.path.as_str()).collect();
        assert_eq!(backed, ["contracts", "core"]);
        assert_eq!(
            ws.package_identities(),
            ["Acme.App", "Acme.Contracts", "Acme.Core"]
        );
    }

    #[test]
    fn test_feature_paths_and_names() {
        let ws = Workspace::new("/work", true, vec![repo("app", "Acme.App", false)]).unwrap();

        assert_eq!(ws.feature_dir("42"), PathBuf::from("/work/42"));
        assert_eq!(
            ws.repo_dir("42", &ws.repositories()[0]),
            PathBuf::from("/work/42/app")
        );
        assert_eq!(feature_branch("42"), "feature/story-42");
        assert_eq!(start_commit_message("42"), "feature/story-42 start");
    }
}
