//! Orphan sweep
//!
//! Removes files left in the download directory that no kept torrent and no
//! unexpired library item accounts for.

use crate::{ExclusionSet, JanitorError};
use reaper_domain::filename::basename;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A file the sweep removed (or would have, in a dry run)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovedFile {
    /// Full path of the file
    pub path: PathBuf,

    /// Size in bytes at the time of removal
    pub size: u64,
}

/// A file the sweep failed to remove
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovalFailure {
    /// Full path of the file
    pub path: PathBuf,

    /// Filesystem error
    pub error: String,
}

/// Result of one sweep
#[derive(Debug, Clone, Default)]
pub struct SweepReport {
    /// Files removed, or selected for removal in a dry run
    pub removed: Vec<RemovedFile>,

    /// Files whose removal failed
    pub failures: Vec<RemovalFailure>,

    /// Files left alone because something protects them
    pub protected: usize,

    /// Directory entries that could not be read
    pub unreadable: usize,

    /// Whether nothing was actually removed
    pub dry_run: bool,
}

impl SweepReport {
    /// Total bytes of the removed files
    pub fn bytes_removed(&self) -> u64 {
        self.removed.iter().map(|f| f.size).sum()
    }
}

/// Walks the download directory and deletes unaccounted-for files
pub struct OrphanSweeper<'a> {
    exclusions: &'a ExclusionSet,
    threshold_days: u32,
    dry_run: bool,
}

impl<'a> OrphanSweeper<'a> {
    /// Create a sweeper
    pub fn new(exclusions: &'a ExclusionSet, threshold_days: u32, dry_run: bool) -> Self {
        Self {
            exclusions,
            threshold_days,
            dry_run,
        }
    }

    /// Whether a file must be kept
    ///
    /// The filename check uses the bare name exactly as it appears on disk
    /// against a case-folded set, so only names that are already lower-case
    /// can match. Mixed-case orphans are still caught by the full-path check
    /// when a kept torrent owns them.
    pub fn is_protected(
        &self,
        path: &Path,
        unexpired_filenames: &HashSet<String>,
        unexpired_filepaths: &HashSet<PathBuf>,
    ) -> bool {
        if self.exclusions.protects_file(path) {
            return true;
        }
        if basename(path).is_some_and(|name| unexpired_filenames.contains(name)) {
            return true;
        }
        unexpired_filepaths.contains(path)
    }

    /// Sweep every regular file under `data_dir`
    ///
    /// A missing or unreadable root is fatal. Anything below it that cannot be
    /// read or removed is logged, recorded, and skipped.
    pub fn sweep(
        &self,
        data_dir: &Path,
        unexpired_filenames: &HashSet<String>,
        unexpired_filepaths: &HashSet<PathBuf>,
    ) -> Result<SweepReport, JanitorError> {
        let metadata = fs::metadata(data_dir).map_err(|e| {
            JanitorError::Filesystem(format!("cannot read data directory '{}': {}", data_dir.display(), e))
        })?;
        if !metadata.is_dir() {
            return Err(JanitorError::Filesystem(format!(
                "data directory '{}' is not a directory",
                data_dir.display()
            )));
        }

        tracing::info!(data_dir = %data_dir.display(), "Sweeping orphaned files");

        let mut report = SweepReport {
            dry_run: self.dry_run,
            ..Default::default()
        };

        for entry in WalkDir::new(data_dir) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.depth() == 0 => {
                    return Err(JanitorError::Filesystem(format!(
                        "cannot walk data directory '{}': {}",
                        data_dir.display(),
                        e
                    )));
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping unreadable entry");
                    report.unreadable += 1;
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            if self.is_protected(path, unexpired_filenames, unexpired_filepaths) {
                tracing::debug!(file = %path.display(), "Keeping protected file");
                report.protected += 1;
                continue;
            }

            let size = entry.metadata().map(|m| m.len()).unwrap_or(0);

            if self.dry_run {
                tracing::info!(
                    "DRY RUN: Would remove {} (unwatched for {} days)",
                    path.display(),
                    self.threshold_days
                );
                report.removed.push(RemovedFile {
                    path: path.to_path_buf(),
                    size,
                });
                continue;
            }

            match fs::remove_file(path) {
                Ok(()) => {
                    tracing::info!(
                        file = %path.display(),
                        size,
                        threshold_days = self.threshold_days,
                        "Removed orphaned file"
                    );
                    report.removed.push(RemovedFile {
                        path: path.to_path_buf(),
                        size,
                    });
                }
                Err(e) => {
                    tracing::warn!(file = %path.display(), error = %e, "Failed to remove file");
                    report.failures.push(RemovalFailure {
                        path: path.to_path_buf(),
                        error: e.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            removed = report.removed.len(),
            protected = report.protected,
            failures = report.failures.len(),
            "Sweep complete"
        );

        Ok(report)
    }
}
