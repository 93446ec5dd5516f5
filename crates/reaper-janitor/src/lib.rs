//! Reaper Janitor
//!
//! Decision engine that expires watched media from a seedbox.
//!
//! # Overview
//!
//! Each pass runs three stages in order:
//! - **Classification**: items whose latest view (or creation, when never
//!   viewed) is at least `threshold_days` old are expired; every file of every
//!   other item is protected by its case-folded basename
//! - **Reconciliation**: each torrent in the download client is kept, skipped
//!   as an anomaly, or erased together with its data on disk
//! - **Sweep**: files left under the client's data directory that nothing
//!   protects are removed
//!
//! Exclusion lists (torrent hashes, filenames, directory fragments) override
//! all of the above.
//!
//! # Safety
//!
//! | Situation | Result |
//! |-----------|--------|
//! | Torrent shares a basename with an unexpired item | Kept, all its files protected |
//! | Torrent hash excluded | Kept, its files protected |
//! | Base path outside the data root | Skipped, never erased |
//! | No files under the base path | Skipped, never erased |
//! | Part of the base path unreadable | Skipped, never erased, readable files protected |
//! | Client erase returns non-zero | Torrent stays in the client; its files are unprotected and removed by the sweep in the same pass |
//! | Library or client listing fails | Pass aborted before anything is erased |
//!
//! # Usage
//!
//! ```no_run
//! use reaper_janitor::{ExclusionSet, Janitor, JanitorConfig};
//! use reaper_plex::PlexClient;
//! use reaper_rtorrent::RtorrentClient;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let library = PlexClient::new("http://localhost:32400", "token")?;
//! let client = RtorrentClient::new("http://localhost/RPC2")?;
//!
//! let config = JanitorConfig {
//!     threshold_days: 45,
//!     dry_run: true,
//!     ..JanitorConfig::new("/media/data")
//! };
//! let mut janitor = Janitor::new(config, ExclusionSet::builtin());
//!
//! janitor.run(&library, &client)?;
//! println!("{}", janitor.metrics().summary());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod classifier;
pub mod config;
pub mod error;
pub mod exclusions;
pub mod indexer;
pub mod janitor;
pub mod metrics;
pub mod reconciler;
pub mod sweeper;

pub use classifier::{Classification, ExpirationClassifier};
pub use config::JanitorConfig;
pub use error::JanitorError;
pub use exclusions::ExclusionSet;
pub use indexer::{FileSet, FileSetIndexer};
pub use janitor::{Janitor, RunReport};
pub use metrics::RunMetrics;
pub use reconciler::{ErasureOutcome, Reconciliation, TorrentReconciler, TorrentReport, TorrentVerdict};
pub use sweeper::{OrphanSweeper, RemovalFailure, RemovedFile, SweepReport};
