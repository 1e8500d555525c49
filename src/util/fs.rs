//! Filesystem utilities.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use walkdir::WalkDir;

use crate::core::paths::{is_override_artifact, is_project_file, is_solution_file};

/// Find all original (non-override) solution files under a directory.
pub fn find_solutions(dir: &Path) -> Vec<PathBuf> {
    walk_files(dir)
        .filter(|p| is_solution_file(p) && !is_override_artifact(p))
        .collect()
}

/// Find every project file under a directory whose stem matches `name`.
///
/// Used to locate a repository's own project by its package identity
/// (`Acme.Contracts` publishes from `Acme.Contracts.csproj`).
pub fn find_project_named(dir: &Path, name: &str) -> Option<PathBuf> {
    walk_files(dir)
        .filter(|p| is_project_file(p) && !is_override_artifact(p))
        .find(|p| p.file_stem().is_some_and(|s| s == name))
}

/// Find all project files under a directory, overrides excluded.
pub fn find_projects(dir: &Path) -> Vec<PathBuf> {
    walk_files(dir)
        .filter(|p| is_project_file(p) && !is_override_artifact(p))
        .collect()
}

fn walk_files(dir: &Path) -> impl Iterator<Item = PathBuf> {
    WalkDir::new(dir)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(e) if e.file_type().is_file() => Some(e.into_path()),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!("walk error: {}", e);
                None
            }
        })
}

/// Ensure a directory exists, creating it if necessary.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("failed to create directory: {}", path.display()))?;
    }
    Ok(())
}

/// Read a file to string, with nice error messages.
pub fn read_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .with_context(|| format!("failed to read file: {}", path.display()))
}

/// Write a string to a file, creating parent directories if needed.
pub fn write_string(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    fs::write(path, contents)
        .with_context(|| format!("failed to write file: {}", path.display()))
}

/// Append entries to a `.gitignore`, skipping any already present.
///
/// Creates the file if it does not exist. Matching is by exact line, so
/// re-running never duplicates an entry.
pub fn append_gitignore_entries(repo_dir: &Path, entries: &[&str]) -> Result<()> {
    let path = repo_dir.join(".gitignore");
    let existing = if path.exists() {
        read_to_string(&path)?
    } else {
        String::new()
    };

    let present: Vec<&str> = existing.lines().map(str::trim).collect();
    let missing: Vec<&str> = entries
        .iter()
        .copied()
        .filter(|e| !present.contains(e))
        .collect();

    if missing.is_empty() {
        return Ok(());
    }

    let mut updated = existing;
    if !updated.is_empty() && !updated.ends_with('\n') {
        updated.push('\n');
    }
    for entry in missing {
        updated.push_str(entry);
        updated.push('\n');
    }

    write_string(&path, &updated)
}
