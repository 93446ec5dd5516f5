//! Configuration file for the CLI.
//!
//! Everything in the file is optional. Service endpoints and the expiry policy
//! come from flags or the environment; the file carries the exclusion lists and
//! tuning knobs that rarely change between runs.

use crate::error::{CliError, Result};
use reaper_janitor::config::DEFAULT_DOWNLOAD_VIEW;
use reaper_janitor::ExclusionSet;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// CLI configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Extra exclusions, merged with the compiled-in ones
    #[serde(default)]
    pub exclusions: Exclusions,

    /// Download client settings
    #[serde(default)]
    pub rtorrent: RtorrentSettings,

    /// HTTP client settings
    #[serde(default)]
    pub http: HttpSettings,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// `[exclusions]` table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Exclusions {
    /// Torrent hashes never erased
    #[serde(default)]
    pub hashes: Vec<String>,

    /// Filenames never swept
    #[serde(default)]
    pub filenames: Vec<String>,

    /// Path fragments whose files are never swept
    #[serde(default)]
    pub directories: Vec<String>,
}

/// `[rtorrent]` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RtorrentSettings {
    /// View whose torrents are reconciled
    #[serde(default = "default_view")]
    pub view: String,
}

/// `[http]` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpSettings {
    /// Per-request timeout for both services
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// `[logging]` table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log filter used when neither `--log-level` nor `RUST_LOG` is set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,

    /// Append-only log file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

impl Config {
    /// Get the default configuration file path.
    pub fn default_path() -> Result<PathBuf> {
        let dir = dirs::config_dir().ok_or_else(|| CliError::Config("Could not find config directory".into()))?;
        Ok(dir.join("reaper").join("config.toml"))
    }

    /// Load configuration.
    ///
    /// An explicit path must exist. Without one, the default path is read if
    /// present and built-in defaults are used otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => match Self::default_path() {
                Ok(path) if path.exists() => Self::from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    /// Parse a configuration file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| CliError::Config(format!("Failed to read '{}': {}", path.display(), e)))?;
        Ok(toml::from_str(&contents)?)
    }

    /// Compiled-in exclusions merged with the `[exclusions]` table.
    pub fn exclusion_set(&self) -> ExclusionSet {
        ExclusionSet::builtin().merge(ExclusionSet::new(
            &self.exclusions.hashes,
            &self.exclusions.filenames,
            &self.exclusions.directories,
        ))
    }
}

impl HttpSettings {
    /// Timeout as a duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for RtorrentSettings {
    fn default() -> Self {
        Self { view: default_view() }
    }
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_view() -> String {
    DEFAULT_DOWNLOAD_VIEW.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}
