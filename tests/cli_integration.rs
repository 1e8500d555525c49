//! CLI integration tests for Flotilla.
//!
//! These tests exercise argument parsing and configuration resolution
//! without touching git or the .NET toolchain.

use std::fs;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get the flotilla binary command.
fn flotilla() -> Command {
    Command::cargo_bin("flotilla").unwrap()
}

/// Create a temporary directory for test workspaces.
fn temp_dir() -> TempDir {
    TempDir::new().unwrap()
}

#[test]
fn test_help_lists_subcommands() {
    flotilla()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("start"))
        .stdout(predicate::str::contains("finish"))
        .stdout(predicate::str::contains("push"))
        .stdout(predicate::str::contains("find"));
}

#[test]
fn test_version() {
    flotilla()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("flotilla"));
}

#[test]
fn test_unknown_subcommand_fails() {
    flotilla().arg("launch").assert().failure();
}

#[test]
fn test_start_requires_story_id() {
    flotilla().arg("start").assert().failure();
}

#[test]
fn test_start_without_config_reports_missing() {
    let tmp = temp_dir();

    flotilla()
        .args(["start", "42"])
        .current_dir(tmp.path())
        .env_remove("FLOTILLA_CONFIG")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no configuration found"));
}

#[test]
fn test_start_rejects_malformed_config() {
    let tmp = temp_dir();
    fs::write(tmp.path().join("flotilla.toml"), "root = [not toml").unwrap();

    flotilla()
        .args(["start", "42"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to parse config file"));
}

#[test]
fn test_finish_rejects_duplicate_package_identity() {
    let tmp = temp_dir();
    let config = format!(
        r#"
root = "{}"

[[repositories]]
path = "a"
remote_url = "https://example.com/a"
package_identity = "Acme.Contracts"

[[repositories]]
path = "b"
remote_url = "https://example.com/b"
package_identity = "Acme.Contracts"
"#,
        tmp.path().display()
    );
    fs::write(tmp.path().join("flotilla.toml"), config).unwrap();

    flotilla()
        .args(["finish", "42"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Acme.Contracts"));
}

#[test]
fn test_explicit_config_flag_wins() {
    let tmp = temp_dir();
    let custom = tmp.path().join("custom.toml");
    fs::write(&custom, "root = [not toml").unwrap();

    // A valid local file exists, but --config points at the broken one.
    fs::write(
        tmp.path().join("flotilla.toml"),
        format!("root = \"{}\"", tmp.path().display()),
    )
    .unwrap();

    flotilla()
        .args(["finish", "42", "--config"])
        .arg(&custom)
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to parse config file"));
}
