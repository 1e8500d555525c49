//! `flotilla push` command

use anyhow::Result;

use flotilla::ops::push_feature;
use flotilla::util::process::SystemRunner;

pub fn execute() -> Result<()> {
    let cwd = super::current_dir()?;
    let runner = SystemRunner;

    let branch = push_feature(&runner, &cwd)?;

    eprintln!("     Pushed {}", branch);
    Ok(())
}
