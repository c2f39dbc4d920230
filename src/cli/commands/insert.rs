//! `kitsupass insert`: add a new entry.
//!
//! The first line of the text is the password. `key: value` lines
//! follow, then free-form notes.

use crate::cli::editor;
use crate::cli::output;
use crate::cli::{open_vault, Cli};
use crate::errors::{KitsupassError, Result};

const TEMPLATE: &str = "\nusername: \nURL: \n";

/// Execute the `insert` command.
pub fn execute(cli: &Cli, name: &str, from_stdin: bool) -> Result<()> {
    let vault = open_vault(cli)?;

    let text = editor::compose(TEMPLATE, from_stdin)?;
    if text.trim().is_empty() {
        return Err(KitsupassError::UserCancelled);
    }

    let stored = vault.insert(name, &text)?;
    if stored != name {
        output::warning(&format!("'{name}' already exists, stored as '{stored}'"));
    }
    output::success(&format!("Inserted '{stored}'"));
    Ok(())
}
