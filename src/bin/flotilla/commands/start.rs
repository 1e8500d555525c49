//! `flotilla start` command

use std::path::PathBuf;

use anyhow::Result;

use crate::cli::StartArgs;
use flotilla::ops::start_feature;
use flotilla::util::process::SystemRunner;

pub fn execute(config: &Option<PathBuf>, args: StartArgs) -> Result<()> {
    let workspace = super::load_workspace(config)?;
    let runner = SystemRunner;

    start_feature(&workspace, &runner, &args.story_id)?;

    eprintln!(
        "     Started story {} in {}",
        args.story_id,
        workspace.feature_dir(&args.story_id).display()
    );
    Ok(())
}
