//! `kitsupass mv`: move an entry or folder.

use crate::cli::output;
use crate::cli::{open_vault, Cli};
use crate::errors::Result;

/// Execute the `mv` command.
pub fn execute(cli: &Cli, name: &str, new_name: &str) -> Result<()> {
    let vault = open_vault(cli)?;
    vault.rename(name, new_name)?;
    output::success(&format!("Moved '{name}' to '{new_name}'"));
    Ok(())
}
