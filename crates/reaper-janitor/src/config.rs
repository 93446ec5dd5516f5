//! Configuration for Janitor runs
//!
//! Built once at startup and handed to the [`Janitor`](crate::Janitor) by value.
//! Nothing in this crate reads the environment.

use crate::JanitorError;
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};

/// Default number of days after which an unwatched item expires
pub const DEFAULT_THRESHOLD_DAYS: u32 = 30;

/// Default download client view to enumerate
pub const DEFAULT_DOWNLOAD_VIEW: &str = "main";

/// Configuration for the Janitor
///
/// # Examples
///
/// ```
/// use reaper_janitor::JanitorConfig;
///
/// let config = JanitorConfig::new("/media/data");
/// assert_eq!(config.threshold_days, 30);
/// assert!(!config.dry_run);
///
/// let config = JanitorConfig {
///     threshold_days: 60,
///     dry_run: true,
///     ..JanitorConfig::new("/media/data")
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JanitorConfig {
    /// Days since last watch at which an item counts as expired (inclusive)
    /// Default: 30
    #[serde(default = "default_threshold_days")]
    pub threshold_days: u32,

    /// Root of the managed download tree
    /// Torrents whose base path is not strictly inside it are never touched
    pub data_root: PathBuf,

    /// Download client view whose torrents are reconciled
    /// Default: "main"
    #[serde(default = "default_download_view")]
    pub download_view: String,

    /// Dry-run mode: log every decision without erasing or removing anything
    /// Default: false
    #[serde(default)]
    pub dry_run: bool,
}

fn default_threshold_days() -> u32 {
    DEFAULT_THRESHOLD_DAYS
}

fn default_download_view() -> String {
    DEFAULT_DOWNLOAD_VIEW.to_string()
}

impl JanitorConfig {
    /// Create a configuration for the given data root with default settings
    pub fn new(data_root: impl Into<PathBuf>) -> Self {
        Self {
            threshold_days: DEFAULT_THRESHOLD_DAYS,
            data_root: data_root.into(),
            download_view: default_download_view(),
            dry_run: false,
        }
    }

    /// Check the configuration before any destructive work starts
    pub fn validate(&self) -> Result<(), JanitorError> {
        if !self.data_root.is_absolute() {
            return Err(JanitorError::Config(format!(
                "data root must be an absolute path, got '{}'",
                self.data_root.display()
            )));
        }
        if self
            .data_root
            .components()
            .any(|c| matches!(c, Component::ParentDir))
        {
            return Err(JanitorError::Config(format!(
                "data root must not contain '..', got '{}'",
                self.data_root.display()
            )));
        }
        if self.download_view.is_empty() {
            return Err(JanitorError::Config("download view must not be empty".into()));
        }
        Ok(())
    }

    /// Whether a torrent base path lies strictly inside the managed root
    ///
    /// The comparison is by path component, so `/media/data2` is not inside
    /// `/media/data`. The root itself and paths with `..` are rejected.
    pub fn is_managed(&self, path: &Path) -> bool {
        path != self.data_root.as_path()
            && path.starts_with(&self.data_root)
            && !path.components().any(|c| matches!(c, Component::ParentDir))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_config_defaults() {
        let config = JanitorConfig::new("/media/data");
        assert_eq!(config.threshold_days, DEFAULT_THRESHOLD_DAYS);
        assert_eq!(config.download_view, "main");
        assert_eq!(config.data_root, PathBuf::from("/media/data"));
        assert!(!config.dry_run);
    }

    #[test]
    fn test_validate_rejects_relative_root() {
        let config = JanitorConfig::new("media/data");
        assert!(matches!(config.validate(), Err(JanitorError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_parent_components() {
        let config = JanitorConfig::new("/media/data/../etc");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_is_managed() {
        let config = JanitorConfig::new("/media/data/");

        assert!(config.is_managed(Path::new("/media/data/Show S01")));
        assert!(config.is_managed(Path::new("/media/data/sub/movie.mkv")));
        assert!(!config.is_managed(Path::new("/other/path/x")));
        assert!(!config.is_managed(Path::new("/media/data2/x")));
        assert!(!config.is_managed(Path::new("/media/data")));
        assert!(!config.is_managed(Path::new("/media/data/../../etc")));
        assert!(!config.is_managed(Path::new("")));
    }

    #[test]
    fn test_serde_defaults() {
        let config: JanitorConfig =
            serde_json::from_str(r#"{"data_root": "/media/data"}"#).unwrap();

        assert_eq!(config.threshold_days, 30);
        assert_eq!(config.download_view, "main");
        assert!(!config.dry_run);
    }

    #[test]
    fn test_serde_roundtrip() {
        let config = JanitorConfig {
            threshold_days: 14,
            dry_run: true,
            ..JanitorConfig::new("/srv/torrents")
        };
        let serialized = serde_json::to_string(&config).unwrap();
        let deserialized: JanitorConfig = serde_json::from_str(&serialized).unwrap();

        assert_eq!(config.threshold_days, deserialized.threshold_days);
        assert_eq!(config.data_root, deserialized.data_root);
        assert_eq!(config.dry_run, deserialized.dry_run);
    }
}
