//! Package report parsing for `dotnet list <project> package --format json`.
//!
//! The JSON shape is a nesting of projects, frameworks, and top-level
//! packages. Parsing is defensive: any missing or malformed payload
//! flattens to an empty list, never an error.

use serde::Deserialize;

/// Root of the `--format json` package report.
#[derive(Debug, Default, Deserialize)]
pub struct PackageReport {
    #[serde(default)]
    pub projects: Vec<ProjectReport>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProjectReport {
    #[serde(default)]
    pub frameworks: Vec<FrameworkReport>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FrameworkReport {
    #[serde(default, rename = "topLevelPackages")]
    pub top_level_packages: Vec<TopLevelPackage>,
}

/// One resolved top-level package.
#[derive(Debug, Deserialize)]
pub struct TopLevelPackage {
    pub id: String,
    #[serde(default, rename = "requestedVersion")]
    pub requested_version: Option<String>,
    #[serde(default, rename = "resolvedVersion")]
    pub resolved_version: Option<String>,
}

impl PackageReport {
    /// Flatten the report to the list of package identities.
    pub fn package_ids(self) -> Vec<String> {
        self.projects
            .into_iter()
            .flat_map(|p| p.frameworks)
            .flat_map(|f| f.top_level_packages)
            .map(|p| p.id)
            .collect()
    }
}

/// Parse a package report, yielding an empty list on malformed input.
pub fn parse_package_report(json: &str) -> Vec<String> {
    match serde_json::from_str::<PackageReport>(json) {
        Ok(report) => report.package_ids(),
        Err(e) => {
            tracing::debug!("unparseable package report: {}", e);
            Vec::new()
        }
    }
}
