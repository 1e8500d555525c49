//! Git operations for repository setup and the feature lifecycle.
//!
//! Everything goes through the injected [`CommandRunner`]; exit codes
//! are checked only where the caller needs the answer (e.g. clone), and
//! queries degrade to empty results like the dotnet adapter's.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::util::process::{find_git, CommandRunner, ProcessBuilder};

/// Git CLI wrapper.
pub struct GitCli<'a> {
    runner: &'a dyn CommandRunner,
    program: PathBuf,
}

impl<'a> GitCli<'a> {
    /// Create a wrapper, locating `git` on PATH.
    pub fn new(runner: &'a dyn CommandRunner) -> Self {
        GitCli {
            runner,
            program: find_git(),
        }
    }

    /// Create a wrapper with an explicit program path.
    pub fn with_program(runner: &'a dyn CommandRunner, program: impl Into<PathBuf>) -> Self {
        GitCli {
            runner,
            program: program.into(),
        }
    }

    fn base(&self) -> ProcessBuilder {
        ProcessBuilder::new(&self.program)
    }

    fn in_repo(&self, repo_dir: &Path) -> ProcessBuilder {
        self.base().cwd(repo_dir)
    }

    /// Clone `remote_url` into `repo_dir`. A failed clone is fatal for
    /// this repository.
    pub fn clone_repo(&self, repo_dir: &Path, remote_url: &str) -> Result<()> {
        let cmd = self
            .base()
            .arg("clone")
            .arg(remote_url)
            .arg(repo_dir);

        let output = self.runner.run(&cmd)?;
        if !output.success() {
            bail!(
                "failed to clone {}: {}",
                remote_url,
                output.stderr.trim()
            );
        }
        Ok(())
    }

    /// Mark the clone as a safe directory so later commands work when
    /// the directory is owned by another user.
    pub fn trust_repo(&self, repo_dir: &Path) -> Result<()> {
        let cmd = self
            .in_repo(repo_dir)
            .args(["config", "--global", "--add", "safe.directory"])
            .arg(repo_dir);
        self.run_tolerant(&cmd)
    }

    /// Create `branch` off `base` and switch to it.
    ///
    /// Tolerates the branch already existing so re-running `start` is
    /// safe.
    pub fn create_branch(&self, repo_dir: &Path, branch: &str, base: &str) -> Result<()> {
        let cmd = self
            .in_repo(repo_dir)
            .args(["checkout", "-b", branch, base]);
        self.run_tolerant(&cmd)
    }

    /// Publish `branch`, setting the upstream.
    pub fn publish_branch(&self, repo_dir: &Path, branch: &str) -> Result<()> {
        let cmd = self
            .in_repo(repo_dir)
            .args(["push", "--set-upstream", "origin", branch]);

        let output = self.runner.run(&cmd)?;
        if !output.success() {
            bail!(
                "failed to push {} from {}: {}",
                branch,
                repo_dir.display(),
                output.stderr.trim()
            );
        }
        Ok(())
    }

    /// Stage everything and record the feature start marker commit.
    ///
    /// `--allow-empty` keeps a clean tree from failing the commit; the
    /// marker must exist for `finish` to find and revert.
    pub fn mark_feature_start(&self, repo_dir: &Path, message: &str) -> Result<()> {
        self.run_tolerant(&self.in_repo(repo_dir).args(["add", "."]))?;
        self.run_tolerant(
            &self
                .in_repo(repo_dir)
                .args(["commit", "--allow-empty", "-m", message]),
        )
    }

    /// Find a commit hash by exact message match.
    ///
    /// Only the newest match is returned; duplicated or missing marker
    /// messages yield `None`.
    pub fn find_commit(&self, repo_dir: &Path, message: &str) -> Option<String> {
        let cmd = self
            .in_repo(repo_dir)
            .arg("log")
            .arg(format!("--grep=^{}$", message))
            .args(["-n", "1", "--pretty=format:%H"]);

        match self.runner.run(&cmd) {
            Ok(output) => {
                let hash = output.stdout.trim().to_string();
                if hash.is_empty() {
                    None
                } else {
                    Some(hash)
                }
            }
            Err(e) => {
                tracing::warn!("commit search failed in {}: {}", repo_dir.display(), e);
                None
            }
        }
    }

    /// Revert the given commit.
    pub fn revert(&self, repo_dir: &Path, hash: &str) -> Result<()> {
        let cmd = self.in_repo(repo_dir).args(["revert", hash]);
        let output = self.runner.run(&cmd)?;
        if !output.success() {
            bail!(
                "failed to revert {} in {}: {}",
                hash,
                repo_dir.display(),
                output.stderr.trim()
            );
        }
        Ok(())
    }

    /// Whether the remote has a head for `branch`.
    pub fn has_remote_branch(&self, repo_dir: &Path, branch: &str) -> bool {
        let cmd = self
            .in_repo(repo_dir)
            .args(["ls-remote", "--heads", "origin", branch]);

        match self.runner.run(&cmd) {
            Ok(output) => !output.stdout.trim().is_empty(),
            Err(e) => {
                tracing::warn!("ls-remote failed in {}: {}", repo_dir.display(), e);
                false
            }
        }
    }

    fn run_tolerant(&self, cmd: &ProcessBuilder) -> Result<()> {
        let output = self
            .runner
            .run(cmd)
            .with_context(|| format!("failed to run `{}`", cmd.display_command()))?;
        if !output.success() {
            tracing::warn!(
                "`{}` exited with {:?}: {}",
                cmd.display_command(),
                output.status,
                output.stderr.trim()
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FakeOutput, FakeRunner};

    #[test]
    fn test_clone_failure_is_fatal() {
        let runner = FakeRunner::new();
        runner.expect_contains("clone", FakeOutput::failure(128, "repository not found"));

        let git = GitCli::with_program(&runner, "git");
        let err = git
            .clone_repo(Path::new("/work/42/app"), "https://example.com/app")
            .unwrap_err();
        assert!(err.to_string().contains("repository not found"));
    }

    #[test]
    fn test_create_branch_tolerates_existing() {
        let runner = FakeRunner::new();
        runner.expect_contains(
            "checkout",
            FakeOutput::failure(128, "a branch named 'feature/story-42' already exists"),
        );

        let git = GitCli::with_program(&runner, "git");
        git.create_branch(Path::new("/work/42/app"), "feature/story-42", "develop")
            .unwrap();
    }

    #[test]
    fn test_find_commit() {
        let runner = FakeRunner::new();
        runner.expect_contains("log", FakeOutput::success("abc123\n"));

        let git = GitCli::with_program(&runner, "git");
        let hash = git.find_commit(Path::new("/work/42/app"), "feature/story-42 start");
        assert_eq!(hash.as_deref(), Some("abc123"));

        let call = &runner.calls()[0];
        assert!(call.contains("--grep=^feature/story-42 start$"));
    }

    #[test]
    fn test_find_commit_absent() {
        let runner = FakeRunner::new();
        runner.expect_contains("log", FakeOutput::success(""));

        let git = GitCli::with_program(&runner, "git");
        assert!(git
            .find_commit(Path::new("/work/42/app"), "feature/story-42 start")
            .is_none());
    }

    #[test]
    fn test_has_remote_branch() {
        let runner = FakeRunner::new();
        runner.expect_contains(
            "ls-remote",
            FakeOutput::success("abc123\trefs/heads/feature/story-42\n"),
        );

        let git = GitCli::with_program(&runner, "git");
        assert!(git.has_remote_branch(Path::new("/work/42/app"), "feature/story-42"));
    }

    #[test]
    fn test_has_remote_branch_empty_output() {
        let runner = FakeRunner::new();
        runner.expect_contains("ls-remote", FakeOutput::success("\n"));

        let git = GitCli::with_program(&runner, "git");
        assert!(!git.has_remote_branch(Path::new("/work/42/app"), "feature/story-42"));
    }

    #[test]
    fn test_mark_feature_start_command_shapes() {
        let runner = FakeRunner::new();
        runner.set_default(FakeOutput::success(""));

        let git = GitCli::with_program(&runner, "git");
        git.mark_feature_start(Path::new("/work/42/app"), "feature/story-42 start")
            .unwrap();

        let calls = runner.calls();
        assert!(calls[0].ends_with("add ."));
        assert!(calls[1].contains("commit --allow-empty -m feature/story-42 start"));
    }
}
