//! File set indexing

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Regular files found under a base path
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSet {
    /// Files that could be read, in path order
    pub files: BTreeSet<PathBuf>,

    /// Some entry below the base path could not be read, so `files` may be
    /// missing part of the tree
    pub incomplete: bool,
}

impl FileSet {
    /// Number of files found
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether no files were found
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Walks a file or directory tree and collects the regular files under it
///
/// Symlinks are not followed. A missing base path yields an empty, complete
/// set; any unreadable entry below it marks the set incomplete.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileSetIndexer;

impl FileSetIndexer {
    /// Create a new indexer
    pub fn new() -> Self {
        Self
    }

    /// Collect every regular file at or under `base`
    ///
    /// Returned paths are `base` joined with the relative path of each file,
    /// so an absolute `base` yields absolute paths.
    pub fn index(&self, base: &Path) -> FileSet {
        let mut set = FileSet::default();

        for entry in WalkDir::new(base) {
            match entry {
                Ok(entry) if entry.file_type().is_file() => {
                    set.files.insert(entry.into_path());
                }
                Ok(_) => {}
                Err(e) if e.depth() == 0 && is_not_found(&e) => {}
                Err(e) => {
                    tracing::warn!(base = %base.display(), error = %e, "Unreadable entry, file set is incomplete");
                    set.incomplete = true;
                }
            }
        }

        set
    }

    /// Total size in bytes of the given files; unreadable files count as zero
    pub fn total_size<'a>(&self, files: impl IntoIterator<Item = &'a PathBuf>) -> u64 {
        files
            .into_iter()
            .filter_map(|path| fs::symlink_metadata(path).ok())
            .map(|metadata| metadata.len())
            .sum()
    }
}

fn is_not_found(error: &walkdir::Error) -> bool {
    error
        .io_error()
        .is_some_and(|e| e.kind() == std::io::ErrorKind::NotFound)
}
