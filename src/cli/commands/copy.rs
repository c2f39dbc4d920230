//! `kitsupass cp`: duplicate an entry.

use crate::cli::output;
use crate::cli::{open_vault, Cli};
use crate::errors::Result;

/// Execute the `cp` command.
pub fn execute(cli: &Cli, name: &str, new_name: &str) -> Result<()> {
    let vault = open_vault(cli)?;
    vault.copy(name, new_name)?;
    output::success(&format!("Copied '{name}' to '{new_name}'"));
    Ok(())
}
