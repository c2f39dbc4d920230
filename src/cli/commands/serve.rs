//! `kitsupass serve`: run the local browser bridge.

use std::sync::Arc;

use crate::channel::{ChannelStore, SecureChannel};
use crate::cli::output;
use crate::cli::{load_settings, vault_handle, Cli};
use crate::errors::Result;
use crate::notify::ConsoleNotifier;
use crate::server::{self, AppState};

/// Execute the `serve` command. Blocks until Ctrl+C or SIGTERM.
pub fn execute(cli: &Cli, addr: Option<&str>) -> Result<()> {
    let settings = load_settings(cli)?;
    let addr = addr.map_or_else(|| settings.bridge_addr(), str::to_string);

    let channel = SecureChannel::new(ChannelStore::load(&settings.channel_config)?)?;

    // Unlock up front so the first browser request does not have to
    // wait on a prompt. A locked store is still served by name.
    let mut vault = vault_handle(cli)?;
    if let Err(e) = vault.open() {
        output::warning(&format!("Store stays locked: {e}"));
    }

    let state = AppState::new(vault, channel, Arc::new(ConsoleNotifier))?;
    output::info(&format!("Bridge listening on http://{addr}"));

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(server::serve(&addr, state))
}
