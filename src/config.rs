//! User configuration loaded from `config.toml`.
//!
//! Every field has a default, so a missing file or a partial file is fine.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub display: DisplayConfig,
    pub clipboard: ClipboardConfig,
    pub tape: TapeConfig,
}

/// How readouts are rendered.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Group the integer part of the display as `1,234,567`.
    pub thousands_separators: bool,
    /// Print the operation trace above the display.
    pub show_trace: bool,
    /// Shown instead of the display numeral after a failed calculation.
    pub error_label: String,
    pub prompt: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            thousands_separators: false,
            show_trace: true,
            error_label: crate::calculator::ERROR_MARKER.to_string(),
            prompt: "> ".to_string(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClipboardConfig {
    /// Copy every completed result to the clipboard.
    pub auto_copy: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TapeConfig {
    /// Maximum number of completed calculations kept. 0 disables the tape.
    pub limit: usize,
}

impl Default for TapeConfig {
    fn default() -> Self {
        Self { limit: 50 }
    }
}

impl Config {
    /// `$XDG_CONFIG_HOME/keycalc/config.toml`, if a config dir is known.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("keycalc").join("config.toml"))
    }

    /// Load from an explicit path. The file must exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::parse(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Load from the default location, falling back to defaults when there
    /// is no file.
    pub fn load_default() -> Result<Self, ConfigError> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            Some(path) => {
                debug!("No config file at {:?}, using defaults", path);
                Ok(Self::default())
            }
            None => Ok(Self::default()),
        }
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}
