//! Solution graph rewriting.
//!
//! For each solution the rewriter runs four phases:
//!
//! 1. *Scanned*: member projects are listed via the adapter.
//! 2. *Overridden*: members referencing a workspace-resident package get
//!    an override project swapped in. All matching packages are applied,
//!    not just the first.
//! 3. *Closed*: the transitive project-reference closure of everything
//!    added is pulled into the solution, guarded by a visited set keyed
//!    on normalized paths so a cyclic reference graph still terminates.
//! 4. *Cleaned*: solution-folder residue the `sln add` operation leaves
//!    behind is stripped with an idempotent line pass.
//!
//! Mutation failures are logged and tolerated; an inconsistent solution
//! is preferred over halting the whole workspace run.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::core::paths::{normalize, override_path, PROJECT_EXT};
use crate::core::workspace::{Repository, Workspace};
use crate::dotnet::adapter::{has_package_reference, DotnetCli};
use crate::ops::overrides::{add_project_reference, create_override};
use crate::util::fs::{find_project_named, read_to_string, write_string};

/// Rewrites one solution at a time against a fixed workspace.
pub struct SolutionRewriter<'a> {
    dotnet: &'a DotnetCli<'a>,
    workspace: &'a Workspace,
    feature_root: PathBuf,
}

impl<'a> SolutionRewriter<'a> {
    /// Create a rewriter for solutions under `feature_root`.
    pub fn new(
        dotnet: &'a DotnetCli<'a>,
        workspace: &'a Workspace,
        feature_root: impl Into<PathBuf>,
    ) -> Self {
        SolutionRewriter {
            dotnet,
            workspace,
            feature_root: feature_root.into(),
        }
    }

    /// Build the override solution for `solution` and return its path.
    ///
    /// Safe to re-run: override artifacts already on disk are reused,
    /// and the adapter's add/remove operations are idempotent.
    pub fn process_solution(&self, solution: &Path) -> Result<PathBuf> {
        let override_sln = override_path(solution);
        tracing::info!(
            "rewriting {} -> {}",
            solution.display(),
            override_sln.display()
        );

        self.ensure_override_solution(solution, &override_sln)?;

        let members = self.dotnet.list_solution_members(solution);
        tracing::debug!("{} member project(s)", members.len());

        let mut added = Vec::new();
        for member in members {
            match self.rewrite_member(&override_sln, &member)? {
                Some(project) => added.push(project),
                None => continue,
            }
        }

        self.close_graph(&override_sln, &added);
        clean_solution_file(&override_sln)?;

        Ok(override_sln)
    }

    /// Create the override solution once per run; its presence on disk
    /// is the idempotence signal.
    fn ensure_override_solution(&self, solution: &Path, override_sln: &Path) -> Result<()> {
        if override_sln.exists() {
            return Ok(());
        }
        let dir = solution.parent().unwrap_or(Path::new("."));
        let name = override_sln
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.dotnet.create_solution(dir, &name)
    }

    /// Swap one member into the override solution.
    ///
    /// Returns the path actually added (the override project for matched
    /// members, the member itself otherwise), or `None` when every
    /// mutation around it failed.
    fn rewrite_member(&self, override_sln: &Path, member: &Path) -> Result<Option<PathBuf>> {
        let matched: Vec<&Repository> = self
            .workspace
            .package_backed()
            .filter(|repo| has_package_reference(self.dotnet, member, &repo.package_identity))
            .collect();

        if matched.is_empty() {
            if let Err(e) = self.dotnet.add_project(override_sln, member) {
                tracing::warn!("failed to add {}: {}", member.display(), e);
                return Ok(None);
            }
            return Ok(Some(member.to_path_buf()));
        }

        // Filesystem failure synthesizing the override is fatal for this
        // solution; tool failures below are not.
        let ov = create_override(member, &self.workspace.package_identities())?;

        for repo in matched {
            match find_project_named(&self.feature_root, &repo.package_identity) {
                Some(project) => add_project_reference(&ov, &project)?,
                None => tracing::warn!(
                    "no project named {} under {}",
                    repo.package_identity,
                    self.feature_root.display()
                ),
            }
        }

        if let Err(e) = self.dotnet.add_project(override_sln, &ov) {
            tracing::warn!("failed to add {}: {}", ov.display(), e);
            return Ok(None);
        }
        // Swap: the original member must not remain alongside its
        // override. Removing an absent entry is a no-op.
        if let Err(e) = self.dotnet.remove_project(override_sln, member) {
            tracing::warn!("failed to remove {}: {}", member.display(), e);
        }

        Ok(Some(ov))
    }

    /// Recursively attach every transitively-referenced project.
    ///
    /// The visited set is keyed by normalized path; each project is
    /// visited at most once even when the reference graph contains a
    /// cycle.
    fn close_graph(&self, override_sln: &Path, roots: &[PathBuf]) {
        let mut visited: HashSet<PathBuf> = roots.iter().map(|p| normalize(p)).collect();
        let mut stack: Vec<PathBuf> = roots.to_vec();

        while let Some(project) = stack.pop() {
            for reference in self.dotnet.list_project_references(&project) {
                if !visited.insert(normalize(&reference)) {
                    continue;
                }
                tracing::debug!("attaching transitive reference {}", reference.display());
                if let Err(e) = self.dotnet.add_project(override_sln, &reference) {
                    tracing::warn!("failed to add {}: {}", reference.display(), e);
                }
                stack.push(reference);
            }
        }
    }
}

/// Strip solution-folder residue from a solution file, in place.
///
/// The file is rewritten only when the pass changes it, so running the
/// cleanup twice produces no further change.
pub fn clean_solution_file(path: &Path) -> Result<()> {
    let text = read_to_string(path)?;
    let cleaned = clean_solution_text(&text);
    if cleaned != text {
        write_string(path, &cleaned)?;
    }
    Ok(())
}

/// Remove every folder-type entry block: a `Project(`-prefixed line that
/// does not name a project file, plus its two following lines.
pub fn clean_solution_text(text: &str) -> String {
    let project_marker = format!(".{}", PROJECT_EXT);
    let lines: Vec<&str> = text.lines().collect();
    let mut kept = Vec::with_capacity(lines.len());

    let mut i = 0;
    while i < lines.len() {
        let line = lines[i];
        if line.trim_start().starts_with("Project(") && !line.contains(&project_marker) {
            i += 3;
            continue;
        }
        kept.push(line);
        i += 1;
    }

    let mut cleaned = kept.join("\n");
    if text.ends_with('\n') && !cleaned.is_empty() {
        cleaned.push('\n');
    }
    cleaned
}
