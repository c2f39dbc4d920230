//! Diagnostic logging setup.
//!
//! Logs go to stderr so stdout stays clean for `show` and `find`. The
//! level comes from `RUST_LOG` and falls back to a per-command default.

use tracing_subscriber::EnvFilter;

/// Default filter for one-shot CLI commands.
pub const CLI_LEVEL: &str = "warn";

/// Default filter for the long-running bridge.
pub const SERVE_LEVEL: &str = "info";

/// Install the global subscriber. Calling it twice is harmless.
pub fn init(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let result = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init();

    if result.is_err() {
        tracing::debug!("global subscriber already installed");
    }
}
