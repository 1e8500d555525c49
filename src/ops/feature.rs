//! Feature lifecycle: start, finish, push, find.
//!
//! Repository setup runs in parallel (each task owns a distinct
//! directory) with a join barrier before the override graph is built.
//! Solutions are then processed strictly sequentially, since
//! interleaved tool invocations against the same solution file can
//! corrupt it.

use std::path::Path;

use anyhow::{Context, Result};
use rayon::prelude::*;

use crate::core::paths::{find_ancestor_containing, story_id_from_path};
use crate::core::workspace::{feature_branch, start_commit_message, Repository, Workspace};
use crate::dotnet::adapter::DotnetCli;
use crate::git::GitCli;
use crate::ops::rewrite::SolutionRewriter;
use crate::ops::suppress::suppress_tests;
use crate::util::fs::{append_gitignore_entries, ensure_dir, find_solutions};
use crate::util::process::CommandRunner;

/// Branch feature branches are cut from.
pub const BASE_BRANCH: &str = "develop";

/// Ignore patterns for the artifacts the rewriter persists.
const OVERRIDE_IGNORE_ENTRIES: [&str; 2] = ["*.override.csproj", "*.override.sln"];

/// Start feature development for a story: set up every repository, then
/// build the override graph for each solution in the workspace.
///
/// A repository that fails to set up is logged and skipped; the rest of
/// the workspace proceeds.
pub fn start_feature(ws: &Workspace, runner: &dyn CommandRunner, story_id: &str) -> Result<()> {
    let feature_dir = ws.feature_dir(story_id);
    ensure_dir(&feature_dir)?;

    let branch = feature_branch(story_id);
    let message = start_commit_message(story_id);

    // One task per repository, join barrier at collect().
    let results: Vec<(String, Result<()>)> = ws
        .repositories()
        .par_iter()
        .map(|repo| {
            let result = setup_repository(ws, runner, story_id, repo, &branch, &message);
            (repo.path.clone(), result)
        })
        .collect();

    for (path, result) in results {
        if let Err(e) = result {
            tracing::error!("repository `{}` setup failed: {:#}", path, e);
        }
    }

    build_overrides(ws, runner, &feature_dir)
}

fn setup_repository(
    ws: &Workspace,
    runner: &dyn CommandRunner,
    story_id: &str,
    repo: &Repository,
    branch: &str,
    message: &str,
) -> Result<()> {
    let repo_dir = ws.repo_dir(story_id, repo);
    ensure_dir(&repo_dir)?;

    let git = GitCli::new(runner);
    if !repo_dir.join(".git").exists() {
        tracing::info!("cloning {} into {}", repo.remote_url, repo_dir.display());
        git.clone_repo(&repo_dir, &repo.remote_url)?;
    }

    git.trust_repo(&repo_dir)?;

    tracing::info!("creating branch {} in {}", branch, repo.path);
    git.create_branch(&repo_dir, branch, BASE_BRANCH)?;

    append_gitignore_entries(&repo_dir, &OVERRIDE_IGNORE_ENTRIES)
        .with_context(|| format!("failed to update .gitignore in {}", repo_dir.display()))?;

    git.mark_feature_start(&repo_dir, message)?;

    Ok(())
}

/// Build the override graph for every solution under `feature_dir`.
///
/// Strictly sequential per solution; a solution that fails is logged
/// and the run continues with the next one.
pub fn build_overrides(ws: &Workspace, runner: &dyn CommandRunner, feature_dir: &Path) -> Result<()> {
    let dotnet = DotnetCli::new(runner);
    let rewriter = SolutionRewriter::new(&dotnet, ws, feature_dir);

    for solution in find_solutions(feature_dir) {
        match rewriter.process_solution(&solution) {
            Ok(override_sln) => {
                if let Err(e) = dotnet.restore(&override_sln) {
                    tracing::warn!("restore failed for {}: {}", override_sln.display(), e);
                }
                if ws.disable_unit_tests() {
                    let dir = solution.parent().unwrap_or(feature_dir);
                    match suppress_tests(dir) {
                        Ok(n) if n > 0 => tracing::info!("suppressed {} test project(s)", n),
                        Ok(_) => {}
                        Err(e) => {
                            tracing::error!("test suppression failed under {}: {:#}", dir.display(), e)
                        }
                    }
                }
            }
            Err(e) => {
                tracing::error!("failed to rewrite {}: {:#}", solution.display(), e);
            }
        }
    }

    Ok(())
}

/// Finish a feature: revert the start marker commit in every repository.
///
/// A repository without the marker commit is logged and skipped; there
/// is no compensating rollback beyond the revert itself.
pub fn finish_feature(ws: &Workspace, runner: &dyn CommandRunner, story_id: &str) -> Result<()> {
    let git = GitCli::new(runner);
    let message = start_commit_message(story_id);

    for repo in ws.repositories() {
        let repo_dir = ws.repo_dir(story_id, repo);
        if !repo_dir.exists() {
            tracing::warn!("repository `{}` not found, skipping", repo.path);
            continue;
        }

        match git.find_commit(&repo_dir, &message) {
            Some(hash) => {
                tracing::info!("reverting {} in `{}`", hash, repo.path);
                if let Err(e) = git.revert(&repo_dir, &hash) {
                    tracing::error!("revert failed in `{}`: {:#}", repo.path, e);
                }
            }
            None => {
                tracing::warn!("no start marker commit in `{}`", repo.path);
            }
        }
    }

    Ok(())
}

/// Push the feature branch of the repository enclosing `cwd`.
///
/// The repository is found by walking upward to the nearest `.git`
/// directory; the story id comes from the feature directory name in the
/// path.
pub fn push_feature(runner: &dyn CommandRunner, cwd: &Path) -> Result<String> {
    let repo_dir = find_ancestor_containing(cwd, ".git")?;
    let story_id = story_id_from_path(cwd)?;
    let branch = feature_branch(&story_id);

    let git = GitCli::new(runner);
    git.publish_branch(&repo_dir, &branch)?;

    Ok(branch)
}

/// Which repositories have a remote feature branch for this story.
pub fn find_feature(
    ws: &Workspace,
    runner: &dyn CommandRunner,
    story_id: &str,
) -> Vec<(String, bool)> {
    let git = GitCli::new(runner);
    let branch = feature_branch(story_id);

    ws.repositories()
        .iter()
        .map(|repo| {
            let repo_dir = ws.repo_dir(story_id, repo);
            let present = git.has_remote_branch(&repo_dir, &branch);
            (repo.path.clone(), present)
        })
        .collect()
}
