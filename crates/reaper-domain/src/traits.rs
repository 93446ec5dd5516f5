//! Trait definitions for external interactions
//!
//! These traits define the boundaries between the decision engine and the two
//! services it consults. Implementations live in other crates. All calls are
//! synchronous and blocking.

use crate::{HistoryEntry, LibraryItem, Section, TorrentHash};
use std::path::PathBuf;

/// Trait for reading a media library and its watch history
///
/// Implemented by the infrastructure layer (reaper-plex)
pub trait LibraryService {
    /// Error type for library operations
    type Error;

    /// List every library section
    fn sections(&self) -> Result<Vec<Section>, Self::Error>;

    /// List the items of a section, with their kind-specific media paths
    ///
    /// The returned items have an empty `history`; use [`LibraryService::history`].
    fn items(&self, section: &Section) -> Result<Vec<LibraryItem>, Self::Error>;

    /// Get the playback history of one item
    fn history(&self, item: &LibraryItem) -> Result<Vec<HistoryEntry>, Self::Error>;
}

/// Trait for the download client's RPC surface
///
/// Implemented by the infrastructure layer (reaper-rtorrent)
pub trait DownloadClient {
    /// Error type for client operations
    type Error;

    /// List the hashes of every download in a view (e.g. "main")
    fn download_list(&self, view: &str) -> Result<Vec<TorrentHash>, Self::Error>;

    /// Get the display name of a download
    fn name(&self, hash: &TorrentHash) -> Result<String, Self::Error>;

    /// Get the base path of a download: its single file, or its directory
    fn base_path(&self, hash: &TorrentHash) -> Result<PathBuf, Self::Error>;

    /// Erase a download from the client; returns the client status code (0 = success)
    ///
    /// This does not touch the data on disk.
    fn erase(&self, hash: &TorrentHash) -> Result<i64, Self::Error>;

    /// Get the client's default data directory
    fn default_directory(&self) -> Result<PathBuf, Self::Error>;
}
