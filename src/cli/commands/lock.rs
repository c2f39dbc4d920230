//! `kitsupass lock`: forget the cached master password.

use crate::cli::output;
use crate::cli::{vault_handle, Cli};
use crate::errors::Result;

/// Execute the `lock` command. Does not need the password.
pub fn execute(cli: &Cli) -> Result<()> {
    let mut vault = vault_handle(cli)?;
    vault.close()?;
    output::success("Store locked");
    Ok(())
}
