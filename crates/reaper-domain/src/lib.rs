//! Reaper Domain Layer
//!
//! This crate contains the data model shared by every Reaper crate and the
//! trait boundaries to the two external services the engine talks to. It does
//! no I/O of its own.
//!
//! ## Key Concepts
//!
//! - **Library item**: a movie or show tracked by the media server, with its
//!   watch history and the media files backing it
//! - **Media kind**: how an item maps to files (`Show`, `Movie`, or `Unknown`)
//! - **Torrent hash**: the download client's identifier for an active download
//! - **Case folding**: every name comparison in the engine goes through
//!   [`filename::casefold`]
//!
//! ## Architecture
//!
//! - Pure data types and helpers only
//! - Service implementations live in `reaper-plex` and `reaper-rtorrent`
//! - The decision engine lives in `reaper-janitor`

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod filename;
pub mod library;
pub mod torrent;
pub mod traits;

// Re-exports for convenience
pub use library::{Episode, HistoryEntry, LibraryItem, MediaKind, Section};
pub use torrent::TorrentHash;
