//! Configuration loading and parsing for the kestrel engine.
//!
//! Parses `kestrel.toml`, preferring a file in the working directory and
//! falling back to the platform config dir. Unknown fields are ignored so
//! the format can grow without breaking older files, and a file that fails
//! to parse degrades to defaults rather than aborting startup.
//!
//! The engine reads exactly one feature gate from here at dispatch time:
//! `[coerce] enabled`, consulted when the coerce sub-mode entry guard runs.
//! Input timeout fields mirror Vim's `timeout`/`timeoutlen` and are consumed
//! by the host input layer, not by the engine itself.

use anyhow::Result;
use serde::Deserialize;
use std::{fs, path::PathBuf};
use tracing::info;

#[derive(Debug, Deserialize, Default, Clone)]
pub struct CoerceConfig {
    /// Opt-in gate for the coerce (case conversion) operator extension.
    #[serde(default)]
    pub enabled: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct InputConfig {
    #[serde(default = "InputConfig::default_timeout")]
    pub timeout: bool,
    #[serde(default = "InputConfig::default_timeoutlen")]
    pub timeoutlen: u32,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            timeout: Self::default_timeout(),
            timeoutlen: Self::default_timeoutlen(),
        }
    }
}

impl InputConfig {
    const fn default_timeout() -> bool {
        true
    }
    const fn default_timeoutlen() -> u32 {
        1000
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct ConfigFile {
    #[serde(default)]
    pub coerce: CoerceConfig,
    #[serde(default)]
    pub input: InputConfig,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Original file contents, retained for diagnostics.
    pub raw: Option<String>,
    pub file: ConfigFile,
}

impl Config {
    pub fn coerce_enabled(&self) -> bool {
        self.file.coerce.enabled
    }

    /// Test/embedding convenience: a config with the coerce gate forced on.
    pub fn with_coerce(enabled: bool) -> Self {
        let mut cfg = Config::default();
        cfg.file.coerce.enabled = enabled;
        cfg
    }
}

/// Best-effort config path following platform conventions: local working
/// directory first, then XDG / AppData.
pub fn discover() -> PathBuf {
    let local = PathBuf::from("kestrel.toml");
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("kestrel").join("kestrel.toml");
    }
    PathBuf::from("kestrel.toml")
}

pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    if let Ok(content) = fs::read_to_string(&path) {
        match toml::from_str::<ConfigFile>(&content) {
            Ok(file) => {
                info!(
                    target: "config",
                    path = %path.display(),
                    coerce = file.coerce.enabled,
                    "config_loaded"
                );
                Ok(Config {
                    raw: Some(content),
                    file,
                })
            }
            Err(_e) => {
                // Malformed file falls back to defaults; startup never fails
                // on configuration.
                Ok(Config::default())
            }
        }
    } else {
        Ok(Config::default())
    }
}
