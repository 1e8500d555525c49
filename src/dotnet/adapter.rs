//! Thin adapter over the `dotnet` CLI.
//!
//! Queries return structured lists parsed from the tool's line- or
//! JSON-oriented output; mutations tolerate non-zero exits because the
//! tool's own validation is intentionally disabled (adding a project
//! that is already a member, or removing one that is absent, must be a
//! logged no-op, not a failure).

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::core::paths::PROJECT_EXT;
use crate::dotnet::packages::parse_package_report;
use crate::util::process::{find_dotnet, CommandRunner, ProcessBuilder};

/// Adapter over the `dotnet` command-line tool.
pub struct DotnetCli<'a> {
    runner: &'a dyn CommandRunner,
    program: PathBuf,
}

impl<'a> DotnetCli<'a> {
    /// Create an adapter, locating `dotnet` on PATH.
    pub fn new(runner: &'a dyn CommandRunner) -> Self {
        DotnetCli {
            runner,
            program: find_dotnet(),
        }
    }

    /// Create an adapter with an explicit program path.
    pub fn with_program(runner: &'a dyn CommandRunner, program: impl Into<PathBuf>) -> Self {
        DotnetCli {
            runner,
            program: program.into(),
        }
    }

    fn base(&self) -> ProcessBuilder {
        ProcessBuilder::new(&self.program)
    }

    /// List the member projects of a solution, resolved against the
    /// solution's directory.
    ///
    /// Runs `dotnet sln <file> list`. Header and blank lines are
    /// discarded; a failed query yields an empty list.
    pub fn list_solution_members(&self, solution: &Path) -> Vec<PathBuf> {
        let Some(dir) = solution.parent() else {
            return Vec::new();
        };
        let Some(name) = solution.file_name() else {
            return Vec::new();
        };

        let cmd = self
            .base()
            .cwd(dir)
            .arg("sln")
            .arg(name)
            .arg("list");

        self.query_lines(&cmd)
            .into_iter()
            .map(|line| dir.join(line))
            .collect()
    }

    /// List a project's own project references, resolved against the
    /// project's directory.
    ///
    /// Runs `dotnet list <file> reference`.
    pub fn list_project_references(&self, project: &Path) -> Vec<PathBuf> {
        let Some(dir) = project.parent() else {
            return Vec::new();
        };
        let Some(name) = project.file_name() else {
            return Vec::new();
        };

        let cmd = self
            .base()
            .cwd(dir)
            .arg("list")
            .arg(name)
            .arg("reference");

        self.query_lines(&cmd)
            .into_iter()
            .map(|line| dir.join(line))
            .collect()
    }

    /// List the resolved top-level package identities of a project.
    ///
    /// Runs `dotnet list <file> package --format json`. A malformed or
    /// absent payload yields an empty list.
    pub fn list_resolved_packages(&self, project: &Path) -> Vec<String> {
        let Some(dir) = project.parent() else {
            return Vec::new();
        };
        let Some(name) = project.file_name() else {
            return Vec::new();
        };

        let cmd = self
            .base()
            .cwd(dir)
            .arg("list")
            .arg(name)
            .arg("package")
            .args(["--format", "json"]);

        match self.runner.run(&cmd) {
            Ok(output) => {
                // Tool banners may precede the payload.
                let json = match output.stdout.find('{') {
                    Some(start) => &output.stdout[start..],
                    None => "",
                };
                parse_package_report(json)
            }
            Err(e) => {
                tracing::warn!("package query failed for {}: {}", project.display(), e);
                Vec::new()
            }
        }
    }

    /// Add a project to a solution. Idempotent: adding an existing
    /// member is tolerated and does not duplicate the entry.
    pub fn add_project(&self, solution: &Path, project: &Path) -> Result<()> {
        let cmd = self.sln_mutation(solution, "add", project)?;
        self.run_tolerant(&cmd)
    }

    /// Remove a project from a solution. Idempotent: removing an absent
    /// member is tolerated.
    pub fn remove_project(&self, solution: &Path, project: &Path) -> Result<()> {
        let cmd = self.sln_mutation(solution, "remove", project)?;
        self.run_tolerant(&cmd)
    }

    /// Create an empty solution `<name>.sln` in `dir`.
    pub fn create_solution(&self, dir: &Path, name: &str) -> Result<()> {
        let cmd = self
            .base()
            .cwd(dir)
            .args(["new", "sln", "-n", name]);
        self.run_tolerant(&cmd)
    }

    /// Restore packages for a solution or project.
    pub fn restore(&self, target: &Path) -> Result<()> {
        let dir = target.parent().unwrap_or(Path::new("."));
        let cmd = self
            .base()
            .cwd(dir)
            .arg("restore")
            .arg(target.file_name().unwrap_or(target.as_os_str()));
        self.run_tolerant(&cmd)
    }

    fn sln_mutation(&self, solution: &Path, verb: &str, project: &Path) -> Result<ProcessBuilder> {
        let dir = solution.parent().unwrap_or(Path::new("."));
        let name = solution
            .file_name()
            .ok_or_else(|| anyhow::anyhow!("not a solution path: {}", solution.display()))?;

        Ok(self
            .base()
            .cwd(dir)
            .arg("sln")
            .arg(name)
            .arg(verb)
            .arg(project))
    }

    /// Run a mutation, tolerating a non-zero exit. Only a spawn failure
    /// surfaces as an error.
    fn run_tolerant(&self, cmd: &ProcessBuilder) -> Result<()> {
        let output = self.runner.run(cmd)?;
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

    /// Run a query and keep only lines that name a project file.
    fn query_lines(&self, cmd: &ProcessBuilder) -> Vec<String> {
        match self.runner.run(cmd) {
            Ok(output) => output
                .stdout
                .lines()
                .map(str::trim)
                .filter(|line| line.contains(&format!(".{}", PROJECT_EXT)))
                .map(str::to_string)
                .collect(),
            Err(e) => {
                tracing::warn!("`{}` failed: {}", cmd.display_command(), e);
                Vec::new()
            }
        }
    }
}

/// Does `project` currently depend on `package_identity`?
///
/// Any failure in the underlying query (missing file, tool error,
/// malformed output) maps to `false`, "package not found", and is
/// never propagated: a missing dependency signal must not abort the
/// whole graph traversal, and a skipped override costs less than a
/// halted run.
pub fn has_package_reference(
    dotnet: &DotnetCli<'_>,
    project: &Path,
    package_identity: &str,
) -> bool {
    dotnet
        .list_resolved_packages(project)
        .iter()
        .any(|id| id == package_identity)
}
