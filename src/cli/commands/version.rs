//! `kitsupass version`: display version information.

use crate::errors::Result;

/// Execute the `version` command.
pub fn execute() -> Result<()> {
    println!("kitsupass {}", env!("CARGO_PKG_VERSION"));
    if cfg!(feature = "keyring-store") {
        println!("password cache: OS keyring");
    } else {
        println!("password cache: disabled (build with --features keyring-store)");
    }
    Ok(())
}
