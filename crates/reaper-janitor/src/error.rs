//! Error types for Janitor operations
//!
//! Only failures that make a whole run untrustworthy surface here. Per-item,
//! per-torrent, and per-file problems are recorded in the run report instead.

use thiserror::Error;

/// Errors that abort a Janitor run
#[derive(Error, Debug)]
pub enum JanitorError {
    /// Library service error while computing the unexpired set
    #[error("Library error: {0}")]
    Library(String),

    /// Download client error while listing or describing torrents
    #[error("Download client error: {0}")]
    DownloadClient(String),

    /// Filesystem error outside a single file or torrent
    #[error("Filesystem error: {0}")]
    Filesystem(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
