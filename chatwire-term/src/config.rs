//! Terminal client configuration file.
//!
//! Location: `~/.config/chatwire/config.toml`. Every key is optional:
//!
//! ```toml
//! [connection]
//! host = "chat.example.org"
//! port = 9101
//! secure = false
//! reconnect_delay_ms = 2000
//!
//! [preferences]
//! theme = "dark"
//! ```

use chatwire_client::ChatError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::theme::Theme;

/// Get the config file path (~/.config/chatwire/config.toml)
pub fn config_file() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("chatwire")
        .join("config.toml")
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TermConfig {
    pub connection: ConnectionSection,
    pub preferences: Preferences,
}

/// Where to connect, expressed as the origin the client is served from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionSection {
    pub host: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    pub secure: bool,
    pub reconnect_delay_ms: u64,
}

impl Default for ConnectionSection {
    fn default() -> Self {
        Self {
            host: "localhost".into(),
            port: Some(chatwire_client::config::DEFAULT_SERVICE_PORT),
            secure: false,
            reconnect_delay_ms: 2000,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub theme: Theme,
}

/// Load the config file.
///
/// Returns defaults if the file doesn't exist or can't be parsed.
pub fn load(path: &Path) -> TermConfig {
    if !path.exists() {
        log::debug!("Config file {} not found, using defaults", path.display());
        return TermConfig::default();
    }

    match std::fs::read_to_string(path) {
        Ok(content) => match toml::from_str::<TermConfig>(&content) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Failed to parse config file: {e}, using defaults");
                TermConfig::default()
            }
        },
        Err(e) => {
            log::warn!("Failed to read config file: {e}, using defaults");
            TermConfig::default()
        }
    }
}

/// Write the config file, creating its directory if needed.
pub fn save(path: &Path, config: &TermConfig) -> Result<(), ChatError> {
    let content = toml::to_string_pretty(config).map_err(|e| ChatError::Config {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    std::fs::write(path, content)?;
    Ok(())
}

/// Persist only the theme preference, keeping everything else in the file.
pub fn save_theme(path: &Path, theme: Theme) -> Result<(), ChatError> {
    let mut config = load(path);
    config.preferences.theme = theme;
    save(path, &config)
}
