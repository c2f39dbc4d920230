//! Configuration: user settings (`settings`).

pub mod settings;

pub use settings::Settings;
