//! `flotilla finish` command

use std::path::PathBuf;

use anyhow::Result;

use crate::cli::FinishArgs;
use flotilla::ops::finish_feature;
use flotilla::util::process::SystemRunner;

pub fn execute(config: &Option<PathBuf>, args: FinishArgs) -> Result<()> {
    let workspace = super::load_workspace(config)?;
    let runner = SystemRunner;

    finish_feature(&workspace, &runner, &args.story_id)?;

    eprintln!("     Finished story {}", args.story_id);
    Ok(())
}
