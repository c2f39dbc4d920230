pub mod channel;
pub mod cli;
pub mod config;
pub mod crypto;
pub mod errors;
pub mod keyring;
pub mod logging;
pub mod notify;
pub mod prompt;
pub mod server;
pub mod vault;
