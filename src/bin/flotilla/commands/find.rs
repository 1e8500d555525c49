//! `flotilla find` command

use std::path::PathBuf;

use anyhow::Result;

use crate::cli::FindArgs;
use flotilla::ops::find_feature;
use flotilla::util::process::SystemRunner;

pub fn execute(config: &Option<PathBuf>, args: FindArgs) -> Result<()> {
    let workspace = super::load_workspace(config)?;
    let runner = SystemRunner;

    let found = find_feature(&workspace, &runner, &args.story_id);
    for (repo, present) in &found {
        let status = if *present { "found" } else { "absent" };
        println!("{:>8}  {}", status, repo);
    }

    if found.iter().any(|(_, present)| *present) {
        Ok(())
    } else {
        anyhow::bail!("no repository has a branch for story {}", args.story_id)
    }
}
