//! Torrent reconciliation
//!
//! Walks every download the client knows about and decides, per torrent,
//! whether it is kept, skipped, or erased. Kept torrents contribute their full
//! file paths to the set the orphan sweep must leave alone.

use crate::indexer::{FileSet, FileSetIndexer};
use crate::{ExclusionSet, JanitorConfig, JanitorError};
use reaper_domain::filename::casefolded_basename;
use reaper_domain::traits::DownloadClient;
use reaper_domain::TorrentHash;
use std::collections::{BTreeSet, HashSet};
use std::fmt::{self, Display};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// What happened when a torrent was erased
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErasureOutcome {
    /// Client erased the torrent and its data was removed from disk
    FullSuccess,

    /// Client erased the torrent; the base path was already gone
    ClientErasedOnly,

    /// Client erased the torrent but removing its data failed
    RemovalFailedAfterErase {
        /// Filesystem error
        error: String,
    },

    /// Client refused or failed the erase; disk was not touched
    ClientEraseFailed {
        /// Status code or call error
        error: String,
    },
}

impl ErasureOutcome {
    /// Get the outcome label used in logs and metrics
    pub fn as_str(&self) -> &'static str {
        match self {
            ErasureOutcome::FullSuccess => "full_success",
            ErasureOutcome::ClientErasedOnly => "client_erased_only",
            ErasureOutcome::RemovalFailedAfterErase { .. } => "removal_failed_after_erase",
            ErasureOutcome::ClientEraseFailed { .. } => "client_erase_failed",
        }
    }

    /// Whether the client no longer tracks the torrent
    pub fn client_erased(&self) -> bool {
        !matches!(self, ErasureOutcome::ClientEraseFailed { .. })
    }
}

impl Display for ErasureOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErasureOutcome::RemovalFailedAfterErase { error }
            | ErasureOutcome::ClientEraseFailed { error } => write!(f, "{}: {}", self.as_str(), error),
            _ => f.write_str(self.as_str()),
        }
    }
}

/// Decision taken for one torrent
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TorrentVerdict {
    /// Hash is excluded; never erased
    Excluded {
        /// Files added to the protected path set
        protected_files: usize,
    },

    /// Base path is not inside the managed root
    PathAnomaly,

    /// No regular files found under the base path
    FileAnomaly,

    /// Part of the tree under the base path could not be read
    UnreadableFiles {
        /// Readable files added to the protected path set
        protected_files: usize,
    },

    /// Shares at least one filename with an unexpired library item
    Kept {
        /// Case-folded basenames that matched
        matched: Vec<String>,
        /// Files added to the protected path set
        protected_files: usize,
    },

    /// Erase was attempted
    Erased(ErasureOutcome),

    /// Would have been erased, but the run is a dry run
    WouldErase {
        /// Files that would have been removed
        files: usize,
    },
}

impl TorrentVerdict {
    /// Short label for reports
    pub fn label(&self) -> &'static str {
        match self {
            TorrentVerdict::Excluded { .. } => "excluded",
            TorrentVerdict::PathAnomaly => "path_anomaly",
            TorrentVerdict::FileAnomaly => "file_anomaly",
            TorrentVerdict::UnreadableFiles { .. } => "unreadable_files",
            TorrentVerdict::Kept { .. } => "kept",
            TorrentVerdict::Erased(outcome) => outcome.as_str(),
            TorrentVerdict::WouldErase { .. } => "would_erase",
        }
    }

    /// Whether this verdict skipped the torrent because of an anomaly
    pub fn is_anomaly(&self) -> bool {
        matches!(
            self,
            TorrentVerdict::PathAnomaly | TorrentVerdict::FileAnomaly | TorrentVerdict::UnreadableFiles { .. }
        )
    }
}

/// One torrent and the verdict reached for it
#[derive(Debug, Clone)]
pub struct TorrentReport {
    /// Info hash
    pub hash: TorrentHash,

    /// Display name reported by the client
    pub name: String,

    /// Base path reported by the client
    pub base_path: PathBuf,

    /// Bytes held by the torrent's files when it was indexed
    pub size: u64,

    /// Decision
    pub verdict: TorrentVerdict,
}

/// Result of reconciling every torrent
#[derive(Debug, Clone, Default)]
pub struct Reconciliation {
    /// Full paths of every file owned by a kept or excluded torrent
    pub unexpired_filepaths: HashSet<PathBuf>,

    /// Per-torrent decisions, in client listing order
    pub reports: Vec<TorrentReport>,
}

impl Reconciliation {
    /// Reports of torrents whose erase was attempted
    pub fn erased(&self) -> impl Iterator<Item = (&TorrentReport, &ErasureOutcome)> {
        self.reports.iter().filter_map(|report| match &report.verdict {
            TorrentVerdict::Erased(outcome) => Some((report, outcome)),
            _ => None,
        })
    }

    /// Number of reports matching a predicate
    pub fn count(&self, predicate: impl Fn(&TorrentVerdict) -> bool) -> usize {
        self.reports.iter().filter(|r| predicate(&r.verdict)).count()
    }
}

/// Matches client torrents against the unexpired filename set
pub struct TorrentReconciler<'a> {
    config: &'a JanitorConfig,
    exclusions: &'a ExclusionSet,
    indexer: FileSetIndexer,
}

impl<'a> TorrentReconciler<'a> {
    /// Create a reconciler for a run
    pub fn new(config: &'a JanitorConfig, exclusions: &'a ExclusionSet) -> Self {
        Self {
            config,
            exclusions,
            indexer: FileSetIndexer::new(),
        }
    }

    /// Reconcile every torrent in the configured view
    ///
    /// Listing torrents and reading their name or base path are fatal on
    /// failure. Erasure problems are recorded per torrent and never abort.
    pub fn reconcile<C>(
        &self,
        client: &C,
        unexpired_filenames: &HashSet<String>,
    ) -> Result<Reconciliation, JanitorError>
    where
        C: DownloadClient,
        C::Error: Display,
    {
        let client_error = |e: C::Error| JanitorError::DownloadClient(e.to_string());
        let hashes = client
            .download_list(&self.config.download_view)
            .map_err(client_error)?;

        tracing::info!(
            view = %self.config.download_view,
            torrents = hashes.len(),
            "Reconciling torrents"
        );

        let mut reconciliation = Reconciliation::default();
        for hash in hashes {
            let name = client.name(&hash).map_err(client_error)?;
            let base_path = client.base_path(&hash).map_err(client_error)?;

            let (verdict, size) = self.decide(
                client,
                &hash,
                &name,
                &base_path,
                unexpired_filenames,
                &mut reconciliation.unexpired_filepaths,
            );

            reconciliation.reports.push(TorrentReport {
                hash,
                name,
                base_path,
                size,
                verdict,
            });
        }

        Ok(reconciliation)
    }

    fn decide<C>(
        &self,
        client: &C,
        hash: &TorrentHash,
        name: &str,
        base_path: &Path,
        unexpired_filenames: &HashSet<String>,
        unexpired_filepaths: &mut HashSet<PathBuf>,
    ) -> (TorrentVerdict, u64)
    where
        C: DownloadClient,
        C::Error: Display,
    {
        let managed = self.config.is_managed(base_path);

        if self.exclusions.excludes_hash(hash) {
            let set = if managed {
                self.indexer.index(base_path)
            } else {
                FileSet::default()
            };
            let size = self.indexer.total_size(&set.files);
            tracing::info!(
                torrent = %name,
                hash = %hash,
                files = set.len(),
                incomplete = set.incomplete,
                "Keeping excluded torrent"
            );
            let protected_files = set.len();
            unexpired_filepaths.extend(set.files);
            return (TorrentVerdict::Excluded { protected_files }, size);
        }

        if !managed {
            tracing::warn!(
                torrent = %name,
                base_path = %base_path.display(),
                data_root = %self.config.data_root.display(),
                "Base path outside the data root, skipping"
            );
            return (TorrentVerdict::PathAnomaly, 0);
        }

        let set = self.indexer.index(base_path);
        self.judge(client, hash, name, base_path, set, unexpired_filenames, unexpired_filepaths)
    }

    /// Decide a managed, non-excluded torrent from its indexed file set
    #[allow(clippy::too_many_arguments)]
    fn judge<C>(
        &self,
        client: &C,
        hash: &TorrentHash,
        name: &str,
        base_path: &Path,
        set: FileSet,
        unexpired_filenames: &HashSet<String>,
        unexpired_filepaths: &mut HashSet<PathBuf>,
    ) -> (TorrentVerdict, u64)
    where
        C: DownloadClient,
        C::Error: Display,
    {
        if set.incomplete {
            // An unread subtree may hold an unexpired file; leave the whole torrent alone
            tracing::warn!(
                torrent = %name,
                base_path = %base_path.display(),
                readable = set.len(),
                "Could not read every file of torrent, skipping"
            );
            let size = self.indexer.total_size(&set.files);
            let protected_files = set.len();
            unexpired_filepaths.extend(set.files);
            return (TorrentVerdict::UnreadableFiles { protected_files }, size);
        }

        let files = set.files;
        if files.is_empty() {
            tracing::warn!(torrent = %name, base_path = %base_path.display(), "No files found for torrent, skipping");
            return (TorrentVerdict::FileAnomaly, 0);
        }
        let size = self.indexer.total_size(&files);

        let matched: Vec<String> = files
            .iter()
            .filter_map(|path| casefolded_basename(path))
            .filter(|name| unexpired_filenames.contains(name))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        if !matched.is_empty() {
            tracing::info!(torrent = %name, matched = ?matched, "Keeping torrent with unexpired files");
            let protected_files = files.len();
            unexpired_filepaths.extend(files);
            return (TorrentVerdict::Kept { matched, protected_files }, size);
        }

        if self.config.dry_run {
            tracing::info!("DRY RUN: Would erase torrent {} ({} files)", name, files.len());
            return (TorrentVerdict::WouldErase { files: files.len() }, size);
        }

        let outcome = erase(client, hash, base_path);
        match &outcome {
            ErasureOutcome::FullSuccess => {
                tracing::info!(torrent = %name, base_path = %base_path.display(), "Erased torrent and removed data")
            }
            ErasureOutcome::ClientErasedOnly => {
                tracing::warn!(torrent = %name, base_path = %base_path.display(), "Erased torrent; data was already gone")
            }
            ErasureOutcome::RemovalFailedAfterErase { error } => {
                tracing::warn!(torrent = %name, base_path = %base_path.display(), error = %error, "Erased torrent but failed to remove data")
            }
            ErasureOutcome::ClientEraseFailed { error } => {
                tracing::warn!(torrent = %name, error = %error, "Client failed to erase torrent, data left in place")
            }
        }

        (TorrentVerdict::Erased(outcome), size)
    }
}

/// Erase a torrent from the client, then remove its base path
///
/// Disk is only touched once the client reports status 0.
fn erase<C>(client: &C, hash: &TorrentHash, base_path: &Path) -> ErasureOutcome
where
    C: DownloadClient,
    C::Error: Display,
{
    match client.erase(hash) {
        Ok(0) => {}
        Ok(status) => {
            return ErasureOutcome::ClientEraseFailed {
                error: format!("client returned status {}", status),
            }
        }
        Err(e) => {
            return ErasureOutcome::ClientEraseFailed {
                error: e.to_string(),
            }
        }
    }

    match remove_path(base_path) {
        Ok(true) => ErasureOutcome::FullSuccess,
        Ok(false) => ErasureOutcome::ClientErasedOnly,
        Err(e) => ErasureOutcome::RemovalFailedAfterErase {
            error: e.to_string(),
        },
    }
}

/// Remove a file or directory tree; `Ok(false)` if nothing was there
fn remove_path(path: &Path) -> io::Result<bool> {
    let metadata = match fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(e),
    };

    if metadata.is_dir() {
        fs::remove_dir_all(path)?;
    } else {
        fs::remove_file(path)?;
    }
    Ok(true)
}
