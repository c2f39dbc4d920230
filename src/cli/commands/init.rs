//! `kitsupass init`: create a new password store.

use crate::cli::output;
use crate::cli::{prompt_new_password, vault_handle, Cli};
use crate::errors::{KitsupassError, Result};

/// Execute the `init` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let mut vault = vault_handle(cli)?;

    if vault.root().exists() {
        output::tip("Use `kitsupass insert <name>` to add entries to the existing store.");
        return Err(KitsupassError::AlreadyExists(
            vault.root().display().to_string(),
        ));
    }

    let (password, confirm) = prompt_new_password()?;
    vault.create(&password, &confirm)?;

    output::success(&format!("Store created at {}", vault.root().display()));
    if let Some(id) = vault.id() {
        output::info(&format!("Store id: {id}"));
    }
    output::tip("Run `kitsupass insert <name>` to add your first entry.");
    Ok(())
}
