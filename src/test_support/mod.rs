//! Test utilities for Flotilla unit tests.
//!
//! The central piece is [`FakeRunner`], a deterministic stand-in for the
//! process-execution capability: it matches commands against patterns
//! and replies with canned output, an optional delay, or a spawn error,
//! while recording every call for later assertions.

use std::sync::Mutex;
use std::time::Duration;

use anyhow::{bail, Result};

use crate::util::process::{CommandRunner, ProcessBuilder, ProcessOutput};

/// Canned reply for one faked command.
#[derive(Debug, Clone)]
pub struct FakeOutput {
    /// Exit status code.
    pub status: i32,
    /// Standard output.
    pub stdout: String,
    /// Standard error.
    pub stderr: String,
    /// Simulated execution time.
    pub delay: Option<Duration>,
    /// When set, the runner fails as if the spawn itself failed.
    pub spawn_error: Option<String>,
}

impl FakeOutput {
    /// A successful reply with the given stdout.
    pub fn success(stdout: impl Into<String>) -> Self {
        FakeOutput {
            status: 0,
            stdout: stdout.into(),
            stderr: String::new(),
            delay: None,
            spawn_error: None,
        }
    }

    /// A failing reply with the given status code and stderr.
    pub fn failure(status: i32, stderr: impl Into<String>) -> Self {
        FakeOutput {
            status,
            stdout: String::new(),
            stderr: stderr.into(),
            delay: None,
            spawn_error: None,
        }
    }

    /// A reply that fails before the command produces any output.
    pub fn spawn_error(message: impl Into<String>) -> Self {
        FakeOutput {
            status: -1,
            stdout: String::new(),
            stderr: String::new(),
            delay: None,
            spawn_error: Some(message.into()),
        }
    }

    /// Add a simulated execution delay.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

/// Pattern for matching faked commands.
#[derive(Debug, Clone)]
pub enum CommandPattern {
    /// Exact match on the full command string.
    Exact(String),
    /// Match if the command starts with the prefix.
    StartsWith(String),
    /// Match if the command contains the substring.
    Contains(String),
    /// Match using a regex pattern.
    Regex(String),
    /// Match any command.
    Any,
}

impl CommandPattern {
    /// Check whether this pattern matches the given command string.
    pub fn matches(&self, cmd: &str) -> bool {
        match self {
            CommandPattern::Exact(s) => cmd == s,
            CommandPattern::StartsWith(s) => cmd.starts_with(s),
            CommandPattern::Contains(s) => cmd.contains(s),
            CommandPattern::Regex(pattern) => regex::Regex::new(pattern)
                .map(|re| re.is_match(cmd))
                .unwrap_or(false),
            CommandPattern::Any => true,
        }
    }
}

#[derive(Debug, Clone)]
struct Expectation {
    pattern: CommandPattern,
    output: FakeOutput,
    times: Option<usize>,
    used: usize,
}

impl Expectation {
    fn available(&self) -> bool {
        match self.times {
            Some(n) => self.used < n,
            None => true,
        }
    }
}

#[derive(Debug, Default)]
struct FakeState {
    expectations: Vec<Expectation>,
    calls: Vec<String>,
    default_output: Option<FakeOutput>,
}

/// Deterministic fake implementation of [`CommandRunner`].
#[derive(Debug, Default)]
pub struct FakeRunner {
    state: Mutex<FakeState>,
}

impl FakeRunner {
    /// Create an empty fake runner.
    pub fn new() -> Self {
        FakeRunner::default()
    }

    /// Expect an exact command.
    pub fn expect(&self, cmd: &str, output: FakeOutput) -> &Self {
        self.push(CommandPattern::Exact(cmd.to_string()), output, None)
    }

    /// Expect a command starting with `prefix`.
    pub fn expect_prefix(&self, prefix: &str, output: FakeOutput) -> &Self {
        self.push(CommandPattern::StartsWith(prefix.to_string()), output, None)
    }

    /// Expect a command containing `substring`.
    pub fn expect_contains(&self, substring: &str, output: FakeOutput) -> &Self {
        self.push(CommandPattern::Contains(substring.to_string()), output, None)
    }

    /// Expect a command containing `substring`, at most `n` times.
    pub fn expect_contains_times(&self, substring: &str, output: FakeOutput, n: usize) -> &Self {
        self.push(CommandPattern::Contains(substring.to_string()), output, Some(n))
    }

    /// Expect a command matching a regex.
    pub fn expect_regex(&self, pattern: &str, output: FakeOutput) -> &Self {
        self.push(CommandPattern::Regex(pattern.to_string()), output, None)
    }

    /// Set the reply for commands no expectation matches.
    pub fn set_default(&self, output: FakeOutput) -> &Self {
        self.state.lock().unwrap().default_output = Some(output);
        self
    }

    fn push(&self, pattern: CommandPattern, output: FakeOutput, times: Option<usize>) -> &Self {
        self.state.lock().unwrap().expectations.push(Expectation {
            pattern,
            output,
            times,
            used: 0,
        });
        self
    }

    /// All command strings run so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Number of calls whose command string contains `substring`.
    pub fn call_count_containing(&self, substring: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|c| c.contains(substring))
            .count()
    }

    /// Verify that every bounded expectation was used exactly its
    /// allotted number of times.
    pub fn verify(&self) -> Result<()> {
        let state = self.state.lock().unwrap();
        for (i, exp) in state.expectations.iter().enumerate() {
            if let Some(expected) = exp.times {
                if exp.used != expected {
                    bail!(
                        "expectation {} was used {} times, expected {}",
                        i,
                        exp.used,
                        expected
                    );
                }
            }
        }
        Ok(())
    }
}

impl CommandRunner for FakeRunner {
    fn run(&self, cmd: &ProcessBuilder) -> Result<ProcessOutput> {
        let full_cmd = cmd.display_command();

        let output = {
            let mut state = self.state.lock().unwrap();
            state.calls.push(full_cmd.clone());

            let matched = state
                .expectations
                .iter_mut()
                .find(|exp| exp.pattern.matches(&full_cmd) && exp.available())
                .map(|exp| {
                    exp.used += 1;
                    exp.output.clone()
                });

            match matched.or_else(|| state.default_output.clone()) {
                Some(output) => output,
                None => bail!("unexpected command: {}", full_cmd),
            }
        };

        if let Some(delay) = output.delay {
            std::thread::sleep(delay);
        }
        if let Some(message) = output.spawn_error {
            bail!("{}", message);
        }

        Ok(ProcessOutput {
            status: Some(output.status),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn git(args: &[&str]) -> ProcessBuilder {
        ProcessBuilder::new("git").args(args)
    }

    #[test]
    fn test_fake_runner_exact_match() {
        let runner = FakeRunner::new();
        runner.expect("git status", FakeOutput::success("clean"));

        let output = runner.run(&git(&["status"])).unwrap();
        assert!(output.success());
        assert_eq!(output.stdout, "clean");
    }

    #[test]
    fn test_fake_runner_unexpected_command() {
        let runner = FakeRunner::new();
        assert!(runner.run(&git(&["status"])).is_err());
    }

    #[test]
    fn test_fake_runner_default_and_calls() {
        let runner = FakeRunner::new();
        runner.set_default(FakeOutput::success(""));

        runner.run(&git(&["clone", "url"])).unwrap();
        runner.run(&git(&["checkout", "-b", "x"])).unwrap();

        assert_eq!(runner.calls().len(), 2);
        assert_eq!(runner.call_count_containing("clone"), 1);
    }

    #[test]
    fn test_fake_runner_bounded_expectation() {
        let runner = FakeRunner::new();
        runner.expect_contains_times("status", FakeOutput::success("a"), 1);
        runner.set_default(FakeOutput::success("b"));

        assert_eq!(runner.run(&git(&["status"])).unwrap().stdout, "a");
        assert_eq!(runner.run(&git(&["status"])).unwrap().stdout, "b");
        runner.verify().unwrap();
    }

    #[test]
    fn test_fake_runner_spawn_error() {
        let runner = FakeRunner::new();
        runner.set_default(FakeOutput::spawn_error("no such program"));
        assert!(runner.run(&git(&["status"])).is_err());
    }

    #[test]
    fn test_pattern_regex() {
        assert!(CommandPattern::Regex("^git (clone|fetch)".into()).matches("git clone url"));
        assert!(!CommandPattern::Regex("^git push".into()).matches("git clone url"));
    }
}
