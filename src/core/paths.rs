//! Path conventions for override artifacts and feature directories.
//!
//! Override siblings are derived purely from the original path by
//! inserting a marker before the extension; the presence of the derived
//! file on disk is the only idempotence signal the rewriter relies on.

use std::path::{Component, Path, PathBuf};

use anyhow::{bail, Result};

/// Marker inserted before the extension of override artifacts.
pub const OVERRIDE_MARKER: &str = "override";

/// Extension of project files.
pub const PROJECT_EXT: &str = "csproj";

/// Extension of solution files.
pub const SOLUTION_EXT: &str = "sln";

/// Derive the override sibling for a project or solution path.
///
/// `src/App/App.csproj` becomes `src/App/App.override.csproj`.
pub fn override_path(original: &Path) -> PathBuf {
    let stem = original
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = original
        .extension()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let file_name = if ext.is_empty() {
        format!("{}.{}", stem, OVERRIDE_MARKER)
    } else {
        format!("{}.{}.{}", stem, OVERRIDE_MARKER, ext)
    };

    original.with_file_name(file_name)
}

/// Whether a path names an override artifact.
pub fn is_override_artifact(path: &Path) -> bool {
    path.file_stem()
        .map(|s| s.to_string_lossy().ends_with(&format!(".{}", OVERRIDE_MARKER)))
        .unwrap_or(false)
}

/// Whether a path names a project file (`.csproj`).
pub fn is_project_file(path: &Path) -> bool {
    path.extension().is_some_and(|e| e == PROJECT_EXT)
}

/// Whether a path names a solution file (`.sln`).
pub fn is_solution_file(path: &Path) -> bool {
    path.extension().is_some_and(|e| e == SOLUTION_EXT)
}

/// Whether a project file follows the test-naming convention.
///
/// Override artifacts are never treated as test projects, even when the
/// original they shadow is one.
pub fn is_test_project(path: &Path) -> bool {
    if !is_project_file(path) || is_override_artifact(path) {
        return false;
    }
    path.file_stem()
        .map(|s| {
            let stem = s.to_string_lossy();
            stem.ends_with("Test") || stem.ends_with("Tests")
        })
        .unwrap_or(false)
}

/// Lexically normalize a path for use as a visited-set key.
///
/// Resolves `.` and `..` components without touching the filesystem, so
/// `a/b/../c/./P.csproj` and `a/c/P.csproj` collide. The reference graph
/// the rewriter walks may contain the same project under several spellings
/// (solutions list relative paths, project references use `..`), and the
/// cycle guard must not depend on which spelling arrives first.
pub fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push("..");
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

/// Search upward from `start` for a directory containing `needle`.
pub fn find_ancestor_containing(start: &Path, needle: &str) -> Result<PathBuf> {
    let mut current = if start.is_dir() {
        start.to_path_buf()
    } else {
        start
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| start.to_path_buf())
    };

    loop {
        if current.join(needle).exists() {
            return Ok(current);
        }
        if !current.pop() {
            bail!(
                "could not find `{}` in `{}` or any parent directory",
                needle,
                start.display()
            );
        }
    }
}

/// Extract the story id from a path inside a feature directory.
///
/// Feature directories are named by the bare story number, so the first
/// path component that parses as an integer wins.
pub fn story_id_from_path(path: &Path) -> Result<String> {
    for component in path.components() {
        let text = component.as_os_str().to_string_lossy();
        if text.parse::<u64>().is_ok() {
            return Ok(text.into_owned());
        }
    }
    bail!(
        "could not find a story number in path `{}`",
        path.display()
    )
}
