//! Subprocess execution utilities.
//!
//! All external tools (`dotnet`, `git`) are invoked through a single
//! [`CommandRunner`] capability so that components never construct their
//! own process launcher. Tests inject a deterministic fake
//! (`test_support::FakeRunner`) instead of spawning anything.

use std::collections::HashMap;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use anyhow::{Context, Result};

/// Builder for subprocess execution.
///
/// Every `arg`/`cwd`/`env` method consumes the builder and returns a new
/// value, so a partially configured command can be cloned and varied
/// without mutating the original.
#[derive(Debug, Clone)]
pub struct ProcessBuilder {
    program: PathBuf,
    args: Vec<String>,
    env: HashMap<String, String>,
    cwd: Option<PathBuf>,
}

impl ProcessBuilder {
    /// Create a new process builder for the given program.
    pub fn new(program: impl AsRef<Path>) -> Self {
        ProcessBuilder {
            program: program.as_ref().to_path_buf(),
            args: Vec::new(),
            env: HashMap::new(),
            cwd: None,
        }
    }

    /// Add a single argument.
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_string_lossy().into_owned());
        self
    }

    /// Add multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args.extend(
            args.into_iter()
                .map(|s| s.as_ref().to_string_lossy().into_owned()),
        );
        self
    }

    /// Set an environment variable.
    pub fn env(mut self, key: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        self.env
            .insert(key.as_ref().to_string(), value.as_ref().to_string());
        self
    }

    /// Set the working directory.
    pub fn cwd(mut self, cwd: impl AsRef<Path>) -> Self {
        self.cwd = Some(cwd.as_ref().to_path_buf());
        self
    }

    /// Get the program path.
    pub fn get_program(&self) -> &Path {
        &self.program
    }

    /// Get the arguments.
    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    /// Get the working directory, if set.
    pub fn get_cwd(&self) -> Option<&Path> {
        self.cwd.as_deref()
    }

    /// Display the command for log and error messages.
    pub fn display_command(&self) -> String {
        let mut parts = vec![self.program.display().to_string()];
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }
}

/// Captured result of a finished subprocess.
#[derive(Debug, Clone)]
pub struct ProcessOutput {
    /// Exit status code (`None` when killed by a signal).
    pub status: Option<i32>,
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
}

impl ProcessOutput {
    /// Whether the process exited with status zero.
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }
}

/// Capability for running external commands.
///
/// The production implementation is [`SystemRunner`]; tests use
/// `test_support::FakeRunner` with canned outputs.
pub trait CommandRunner: Send + Sync {
    /// Spawn the command, wait for it, and capture its output.
    ///
    /// A non-zero exit is not an error at this level; callers decide
    /// whether to tolerate it.
    fn run(&self, cmd: &ProcessBuilder) -> Result<ProcessOutput>;
}

/// Runner that actually spawns processes.
#[derive(Debug, Clone, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, cmd: &ProcessBuilder) -> Result<ProcessOutput> {
        let mut command = Command::new(cmd.get_program());
        command.args(cmd.get_args());
        for (key, value) in &cmd.env {
            command.env(key, value);
        }
        if let Some(cwd) = cmd.get_cwd() {
            command.current_dir(cwd);
        }
        command.stdout(Stdio::piped());
        command.stderr(Stdio::piped());

        tracing::debug!("running `{}`", cmd.display_command());

        let output = command
            .output()
            .with_context(|| format!("failed to spawn `{}`", cmd.display_command()))?;

        Ok(ProcessOutput {
            status: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Find an executable in PATH.
pub fn find_executable(name: &str) -> Option<PathBuf> {
    which::which(name).ok()
}

/// Locate the `dotnet` CLI, falling back to the bare name so the OS
/// resolves it at spawn time.
pub fn find_dotnet() -> PathBuf {
    find_executable("dotnet").unwrap_or_else(|| PathBuf::from("dotnet"))
}

/// Locate the `git` CLI.
pub fn find_git() -> PathBuf {
    find_executable("git").unwrap_or_else(|| PathBuf::from("git"))
}
