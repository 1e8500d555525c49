//! Build-tool integration: the CLI adapter and package-report parsing.

pub mod adapter;
pub mod packages;

pub use adapter::{has_package_reference, DotnetCli};
pub use packages::parse_package_report;
