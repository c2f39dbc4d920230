//! `kitsupass rm`: remove an entry from the store.

use dialoguer::Confirm;

use crate::cli::output;
use crate::cli::{open_vault, Cli};
use crate::errors::{KitsupassError, Result};

/// Execute the `rm` command.
pub fn execute(cli: &Cli, name: &str, force: bool) -> Result<()> {
    let vault = open_vault(cli)?;
    if !vault.contains(name) {
        return Err(KitsupassError::NotFound(name.to_string()));
    }

    // Unless --force is set, ask for confirmation before deleting.
    if !force {
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete entry '{name}'?"))
            .default(false)
            .interact()
            .map_err(|e| KitsupassError::CommandFailed(format!("confirm prompt: {e}")))?;

        if !confirmed {
            output::info("Cancelled.");
            return Ok(());
        }
    }

    vault.delete(name)?;
    output::success(&format!("Deleted '{name}'"));
    Ok(())
}
