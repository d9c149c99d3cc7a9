//! Application configuration.
//!
//! Configuration is optional and read-only, stored as TOML:
//! - Linux: `~/.config/deadlock-rpc/config.toml`
//! - Windows: `%APPDATA%/deadlock-rpc/config.toml`

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Discord application id the presence is published under.
    #[serde(default = "default_client_id")]
    pub client_id: String,

    /// Executable name of the game (case-insensitive).
    #[serde(default = "default_process_name")]
    pub process_name: String,

    /// Seconds between probes. Values below 1 are raised to 1.
    #[serde(default = "default_update_interval")]
    pub update_interval: u64,

    /// Read the console log to show the current hero.
    #[serde(default = "default_true")]
    pub hero_detection: bool,

    /// Size of the trailing console log window (bytes).
    #[serde(default = "default_log_tail_bytes")]
    pub log_tail_bytes: u64,

    /// Explicit console log location, tried before the Steam-derived ones.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub console_log_path: Option<PathBuf>,

    /// Extra or replacement hero id to display name mappings.
    #[serde(default)]
    pub heroes: BTreeMap<String, String>,
}

fn default_client_id() -> String {
    "1469933400633639003".into()
}

fn default_process_name() -> String {
    deadlock_rpc_session::DEADLOCK_PROCESS.into()
}

fn default_update_interval() -> u64 {
    deadlock_rpc_session::DEFAULT_UPDATE_INTERVAL.as_secs()
}

fn default_true() -> bool {
    true
}

fn default_log_tail_bytes() -> u64 {
    deadlock_rpc_game_log::DEFAULT_TAIL_BYTES
}

impl Default for Config {
    fn default() -> Self {
        Self {
            client_id: default_client_id(),
            process_name: default_process_name(),
            update_interval: default_update_interval(),
            hero_detection: default_true(),
            log_tail_bytes: default_log_tail_bytes(),
            console_log_path: None,
            heroes: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Loads configuration from the platform path, or defaults if absent.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&config_path()?)
    }

    /// Loads configuration from `path`, or defaults if the file does not exist.
    ///
    /// The file is never created.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no configuration file, using defaults");
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        tracing::debug!(path = %path.display(), "configuration read");
        Ok(config)
    }

    /// Probe interval, at least one second.
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.update_interval.max(1))
    }
}

/// Returns the platform-specific configuration file path.
pub fn config_path() -> anyhow::Result<PathBuf> {
    #[cfg(target_os = "linux")]
    {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
        Ok(PathBuf::from(home)
            .join(".config")
            .join("deadlock-rpc")
            .join("config.toml"))
    }

    #[cfg(target_os = "windows")]
    {
        let appdata =
            std::env::var("APPDATA").unwrap_or_else(|_| "C:\\Users\\Default\\AppData".into());
        Ok(PathBuf::from(appdata).join("deadlock-rpc").join("config.toml"))
    }

    #[cfg(not(any(target_os = "linux", target_os = "windows")))]
    {
        Ok(PathBuf::from("/tmp/deadlock-rpc/config.toml"))
    }
}
