//! `kitsupass show` / `kitsupass ls`: print an entry or list a folder.

use crate::cli::output;
use crate::cli::{open_vault, Cli};
use crate::errors::Result;

/// Execute the `show` command. No name lists the whole store.
pub fn execute(cli: &Cli, name: Option<&str>) -> Result<()> {
    let vault = open_vault(cli)?;
    let text = vault.show(name.unwrap_or(""))?;

    if text.is_empty() && name.is_none() {
        output::info("No entries in this store yet.");
        return Ok(());
    }
    println!("{text}");
    Ok(())
}
