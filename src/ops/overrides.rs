//! Override project synthesis.
//!
//! An override project is a minimal MSBuild document that imports the
//! original project unconditionally and declares removal of every
//! package identity known to the workspace. Declaring removal of a
//! package the original never referenced is a no-op for the build tool,
//! so the synthesizer never needs to know which packages a project
//! actually uses.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::core::paths::override_path;
use crate::util::fs::{read_to_string, write_string};

/// Synthesize (or reuse) the override project for `original`.
///
/// The override path is derived purely from the original path. If a file
/// already exists there it is returned unchanged, without any content
/// comparison or refresh; on-disk presence is the sole idempotence
/// signal.
pub fn create_override(original: &Path, package_identities: &[&str]) -> Result<PathBuf> {
    let path = override_path(original);
    if path.exists() {
        tracing::debug!("reusing existing override {}", path.display());
        return Ok(path);
    }

    let document = render_override(original, package_identities);
    write_string(&path, &document)?;
    tracing::info!("created override {}", path.display());

    Ok(path)
}

fn render_override(original: &Path, package_identities: &[&str]) -> String {
    let mut doc = String::new();
    doc.push_str("<Project Sdk=\"Microsoft.NET.Sdk\">\n");
    doc.push_str(&format!(
        "  <Import Project=\"{}\" />\n",
        original.display()
    ));
    doc.push_str("  <ItemGroup>\n");
    for identity in package_identities {
        doc.push_str(&format!(
            "    <PackageReference Remove=\"{}\" />\n",
            identity
        ));
    }
    doc.push_str("  </ItemGroup>\n");
    doc.push_str("</Project>\n");
    doc
}

/// Append a project reference to an override project.
///
/// This is what reroutes the removed package dependency to the sibling
/// repository's source: the closure pass later discovers the referenced
/// project and pulls it into the solution. Skips cleanly when the
/// include path is already present.
pub fn add_project_reference(override_project: &Path, referenced: &Path) -> Result<()> {
    let text = read_to_string(override_project)?;
    let include = format!("Include=\"{}\"", referenced.display());
    if text.contains(&include) {
        return Ok(());
    }

    let group = format!(
        "  <ItemGroup>\n    <ProjectReference {} />\n  </ItemGroup>\n",
        include
    );

    let updated = match text.rfind("</Project>") {
        Some(pos) => {
            let mut s = String::with_capacity(text.len() + group.len());
            s.push_str(&text[..pos]);
            s.push_str(&group);
            s.push_str(&text[pos..]);
            s
        }
        None => {
            let mut s = text;
            s.push_str(&group);
            s
        }
    };

    write_string(override_project, &updated)
}
