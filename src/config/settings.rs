use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::errors::{KitsupassError, Result};

/// User-level configuration, loaded from `<config_dir>/kitsupass/config.toml`.
///
/// Every field has a sensible default so Kitsupass works out-of-the-box
/// without any config file at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Root directory of the password store.
    #[serde(default = "default_vault_path")]
    pub vault_path: PathBuf,

    /// Address the browser bridge listens on.
    #[serde(default = "default_bridge_host")]
    pub bridge_host: String,

    /// Port the browser bridge listens on.
    #[serde(default = "default_bridge_port")]
    pub bridge_port: u16,

    /// JSON file holding the bridge key pair and paired browsers.
    #[serde(default = "default_channel_config")]
    pub channel_config: PathBuf,
}

// ── Serde default helpers ────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "kitsupass")
}

fn default_vault_path() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".kitsupass"))
}

fn default_bridge_host() -> String {
    "127.0.0.1".to_string()
}

fn default_bridge_port() -> u16 {
    12821
}

fn default_channel_config() -> PathBuf {
    config_dir().join("bridge.json")
}

fn config_dir() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".kitsupass"))
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            vault_path: default_vault_path(),
            bridge_host: default_bridge_host(),
            bridge_port: default_bridge_port(),
            channel_config: default_channel_config(),
        }
    }
}

impl Settings {
    /// Name of the config file inside the config directory.
    const FILE_NAME: &'static str = "config.toml";

    /// Default location of the config file.
    pub fn default_path() -> PathBuf {
        config_dir().join(Self::FILE_NAME)
    }

    /// Load settings from the default location.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_path())
    }

    /// Load settings from `config_path`.
    ///
    /// If the file does not exist, sensible defaults are returned.
    /// If the file exists but cannot be parsed, an error is returned.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(config_path)?;

        let settings: Settings = toml::from_str(&contents).map_err(|e| {
            KitsupassError::ConfigError(format!("Failed to parse {}: {e}", config_path.display()))
        })?;

        Ok(settings)
    }

    /// The address the bridge binds to, as `host:port`.
    pub fn bridge_addr(&self) -> String {
        format!("{}:{}", self.bridge_host, self.bridge_port)
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn default_settings_are_sensible() {
        let s = Settings::default();
        assert_eq!(s.bridge_host, "127.0.0.1");
        assert_eq!(s.bridge_port, 12821);
        assert!(s.vault_path.ends_with("kitsupass"));
        assert!(s.channel_config.ends_with("bridge.json"));
    }

    #[test]
    fn load_returns_defaults_when_no_config_file() {
        let tmp = TempDir::new().unwrap();
        let settings = Settings::load_from(&tmp.path().join("config.toml")).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn load_parses_toml_file() {
        let tmp = TempDir::new().unwrap();
        let config = r#"
vault_path = "/srv/passwords"
bridge_host = "0.0.0.0"
bridge_port = 9000
channel_config = "/srv/bridge.json"
"#;
        let path = tmp.path().join("config.toml");
        fs::write(&path, config).unwrap();

        let settings = Settings::load_from(&path).unwrap();
        assert_eq!(settings.vault_path, PathBuf::from("/srv/passwords"));
        assert_eq!(settings.bridge_addr(), "0.0.0.0:9000");
        assert_eq!(settings.channel_config, PathBuf::from("/srv/bridge.json"));
    }

    #[test]
    fn load_uses_defaults_for_missing_fields() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, "bridge_port = 4000\n").unwrap();

        let settings = Settings::load_from(&path).unwrap();
        assert_eq!(settings.bridge_port, 4000);
        assert_eq!(settings.bridge_host, "127.0.0.1");
    }

    #[test]
    fn load_errors_on_invalid_toml() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, "not valid {{toml").unwrap();

        assert!(matches!(
            Settings::load_from(&path),
            Err(KitsupassError::ConfigError(_))
        ));
    }

    #[test]
    fn load_errors_on_unknown_key() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, "bridge_prot = 1\n").unwrap();

        assert!(Settings::load_from(&path).is_err());
    }
}
