//! Settings parser for ~/.config/wadb/config.toml

use serde::Deserialize;
use std::path::PathBuf;
use wadb_core::prelude::*;

const CONFIG_FILENAME: &str = "config.toml";
const WADB_DIR: &str = "wadb";

/// Application settings. Every field is optional; the file itself is too.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    /// Explicit adb binary to use instead of the one found on PATH
    #[serde(default)]
    pub adb_path: Option<String>,

    /// Ceiling for captured command output, in bytes
    #[serde(default)]
    pub max_output_bytes: Option<usize>,
}

impl Settings {
    /// Load settings from the platform config directory.
    ///
    /// A missing file yields defaults; a malformed file is an error the
    /// user should hear about rather than have silently ignored.
    pub fn load() -> Result<Self> {
        match config_path() {
            Some(path) if path.exists() => Self::parse(&std::fs::read_to_string(&path)?),
            _ => Ok(Self::default()),
        }
    }

    fn parse(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| Error::config(format!("invalid config: {e}")))
    }
}

fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(WADB_DIR).join(CONFIG_FILENAME))
}
