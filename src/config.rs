//! Application configuration.
//!
//! The configuration is loaded from a JSON file, either the one passed on the
//! command line (`--config <path>`) or `config.json` in the per-user config
//! directory.  The top-level schema uses a `"gesture"` key so the file can be
//! extended with additional sections later without breaking backward
//! compatibility.
//!
//! # Example
//!
//! ```json
//! {
//!   "gesture": {
//!     "modifier": "left-control",
//!     "cell_keys": "numpad"
//!   }
//! }
//! ```

use crate::gesture::GestureConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration.
///
/// Every field is optional: a minimal `{}` file is valid and all sections
/// fall back to their compiled-in defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Which keys drive the gesture.
    #[serde(default)]
    pub gesture: GestureConfig,
}

impl Config {
    /// Load configuration from a JSON file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError(format!("failed to read {}: {}", path.display(), e)))?;
        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| ConfigError(format!("failed to parse {}: {}", path.display(), e)))?;
        Ok(config)
    }

    /// Default location of the config file: `<config dir>/padsnap/config.json`.
    ///
    /// The config dir is `%APPDATA%` when set, then `$XDG_CONFIG_HOME`, then
    /// `$HOME/.config`.  Returns `None` if none of these is available.
    pub fn default_path() -> Option<PathBuf> {
        config_dir_from(|key| std::env::var(key).ok())
            .map(|dir| dir.join("padsnap").join("config.json"))
    }
}

/// Resolve the per-user config directory from an environment lookup.
fn config_dir_from(env: impl Fn(&str) -> Option<String>) -> Option<PathBuf> {
    let non_empty = |key: &str| env(key).filter(|v| !v.is_empty());
    if let Some(appdata) = non_empty("APPDATA") {
        return Some(PathBuf::from(appdata));
    }
    if let Some(xdg) = non_empty("XDG_CONFIG_HOME") {
        return Some(PathBuf::from(xdg));
    }
    non_empty("HOME").map(|home| PathBuf::from(home).join(".config"))
}

/// Error from loading or parsing a configuration file.
#[derive(Debug, thiserror::Error)]
#[error("config error: {0}")]
pub struct ConfigError(String);
