//! Test suppression: strip test projects in place.
//!
//! The one destructive, non-override edit in the system. Each matching
//! project file loses its project-reference elements and gains a blanket
//! remove item-group for compiled/content/embedded items. A sentinel
//! marker makes re-runs detectable: an already-suppressed file is
//! skipped without touching it again.

use std::path::Path;

use anyhow::Result;

use crate::core::paths::is_test_project;
use crate::util::fs::{find_projects, read_to_string, write_string};

/// Sentinel recorded in suppressed project files.
pub const SUPPRESSION_MARKER: &str = "<!-- flotilla: tests suppressed -->";

/// Suppress every test project under `dir`.
///
/// Returns the number of files changed. Override artifacts are never
/// touched, nor are projects outside the test-naming convention.
pub fn suppress_tests(dir: &Path) -> Result<usize> {
    let mut changed = 0;
    for project in find_projects(dir) {
        if !is_test_project(&project) {
            continue;
        }
        if suppress_project(&project)? {
            tracing::info!("suppressed tests in {}", project.display());
            changed += 1;
        }
    }
    Ok(changed)
}

/// Suppress a single project file in place.
///
/// Returns `false` when the file already carries the marker.
pub fn suppress_project(path: &Path) -> Result<bool> {
    let text = read_to_string(path)?;
    if text.contains(SUPPRESSION_MARKER) {
        tracing::debug!("already suppressed: {}", path.display());
        return Ok(false);
    }

    let stripped = strip_project_references(&text);
    let suppressed = insert_suppression_group(&stripped);
    write_string(path, &suppressed)?;

    Ok(true)
}

/// Drop every project-reference element, self-closing or block form.
fn strip_project_references(text: &str) -> String {
    let mut kept = Vec::new();
    let mut in_reference = false;

    for line in text.lines() {
        let trimmed = line.trim();
        if in_reference {
            if trimmed.contains("</ProjectReference>") {
                in_reference = false;
            }
            continue;
        }
        if trimmed.starts_with("<ProjectReference") {
            if !trimmed.ends_with("/>") && !trimmed.contains("</ProjectReference>") {
                in_reference = true;
            }
            continue;
        }
        kept.push(line);
    }

    let mut result = kept.join("\n");
    if text.ends_with('\n') && !result.is_empty() {
        result.push('\n');
    }
    result
}

/// Append the marker and the blanket remove item-group before the
/// closing project tag.
fn insert_suppression_group(text: &str) -> String {
    let group = format!(
        "  {}\n  <ItemGroup>\n    <Compile Remove=\"**\" />\n    <Content Remove=\"**\" />\n    <EmbeddedResource Remove=\"**\" />\n  </ItemGroup>\n",
        SUPPRESSION_MARKER
    );

    match text.rfind("</Project>") {
        Some(pos) => {
            let mut s = String::with_capacity(text.len() + group.len());
            s.push_str(&text[..pos]);
            s.push_str(&group);
            s.push_str(&text[pos..]);
            s
        }
        None => {
            let mut s = text.to_string();
            s.push_str(&group);
            s
        }
    }
}
