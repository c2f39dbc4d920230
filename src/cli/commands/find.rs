//! `kitsupass find`: list entry names containing a substring.

use crate::cli::{vault_handle, Cli};
use crate::errors::Result;

/// Execute the `find` command. Names only, so no password is needed.
pub fn execute(cli: &Cli, needle: &str) -> Result<()> {
    let vault = vault_handle(cli)?;
    let mut names: Vec<String> = vault.find(needle)?.iter().collect();
    names.sort();

    for name in names {
        println!("{name}");
    }
    Ok(())
}
