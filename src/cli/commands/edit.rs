//! `kitsupass edit`: replace the text of an existing entry.
//!
//! Decrypts the entry to a private temp file, launches the editor, and
//! re-encrypts whatever was saved.

use zeroize::Zeroizing;

use crate::cli::editor;
use crate::cli::output;
use crate::cli::{open_vault, Cli};
use crate::errors::{KitsupassError, Result};
use crate::vault::Vault;

/// Execute the `edit` command.
pub fn execute(cli: &Cli, name: &str, from_stdin: bool) -> Result<()> {
    let vault = open_vault(cli)?;
    let current = current_text(&vault, name)?;

    let text = editor::compose(&current, from_stdin)?;
    if text.as_str() == current.as_str() {
        output::info("No changes detected.");
        return Ok(());
    }

    vault.edit(name, &text)?;
    output::success(&format!("Updated '{name}'"));
    Ok(())
}

/// The entry's current text; folders are not editable.
fn current_text(vault: &Vault, name: &str) -> Result<Zeroizing<String>> {
    if !vault.contains(name) {
        return Err(KitsupassError::NotFound(name.to_string()));
    }
    Ok(Zeroizing::new(vault.show(name)?))
}
