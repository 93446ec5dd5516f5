//! Exclusion policy
//!
//! Three independent, case-folded sets consulted before any destructive action.
//! Membership in a relevant set forces KEEP regardless of watch state.

use reaper_domain::filename::{casefold, casefolded_basename};
use reaper_domain::TorrentHash;
use std::collections::HashSet;
use std::path::Path;

/// Torrent hashes that are never erased
pub const BUILTIN_EXCLUDED_HASHES: &[&str] = &[];

/// Filenames that are never swept
pub const BUILTIN_EXCLUDED_FILENAMES: &[&str] = &["rtorrent.lock"];

/// Path fragments that protect every file whose path contains them
pub const BUILTIN_EXCLUDED_DIRECTORIES: &[&str] = &[".session", "lost+found"];

/// Static exclusion sets, read-only for the duration of a run
///
/// # Examples
///
/// ```
/// use reaper_janitor::ExclusionSet;
/// use std::path::Path;
///
/// let exclusions = ExclusionSet::new(
///     ["ABCDEF"],
///     ["Surveillance.mp4"],
///     ["/keep/"],
/// );
/// assert!(exclusions.excludes_filename("surveillance.MP4"));
/// assert!(exclusions.excludes_path(Path::new("/media/data/Keep/a.mkv")));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionSet {
    hashes: HashSet<String>,
    filenames: HashSet<String>,
    directories: HashSet<String>,
}

fn folded<I, S>(values: I) -> HashSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    values
        .into_iter()
        .map(|value| casefold(value.as_ref()))
        .filter(|value| !value.is_empty())
        .collect()
}

impl ExclusionSet {
    /// Build an exclusion set; every entry is case-folded and empty entries dropped
    pub fn new<H, F, D>(hashes: H, filenames: F, directories: D) -> Self
    where
        H: IntoIterator,
        H::Item: AsRef<str>,
        F: IntoIterator,
        F::Item: AsRef<str>,
        D: IntoIterator,
        D::Item: AsRef<str>,
    {
        Self {
            hashes: folded(hashes),
            filenames: folded(filenames),
            directories: folded(directories),
        }
    }

    /// The compiled-in exclusions
    pub fn builtin() -> Self {
        Self::new(
            BUILTIN_EXCLUDED_HASHES.iter().copied(),
            BUILTIN_EXCLUDED_FILENAMES.iter().copied(),
            BUILTIN_EXCLUDED_DIRECTORIES.iter().copied(),
        )
    }

    /// Union of two exclusion sets
    pub fn merge(mut self, other: ExclusionSet) -> Self {
        self.hashes.extend(other.hashes);
        self.filenames.extend(other.filenames);
        self.directories.extend(other.directories);
        self
    }

    /// Whether the torrent must never be erased
    pub fn excludes_hash(&self, hash: &TorrentHash) -> bool {
        self.hashes.contains(&hash.casefolded())
    }

    /// Whether a bare filename is protected
    pub fn excludes_filename(&self, name: &str) -> bool {
        self.filenames.contains(&casefold(name))
    }

    /// Whether any excluded directory fragment occurs in the full path
    pub fn excludes_path(&self, path: &Path) -> bool {
        if self.directories.is_empty() {
            return false;
        }
        let folded_path = casefold(&path.to_string_lossy());
        self.directories
            .iter()
            .any(|fragment| folded_path.contains(fragment.as_str()))
    }

    /// Whether a file is protected by the filename or directory rules
    pub fn protects_file(&self, path: &Path) -> bool {
        casefolded_basename(path).is_some_and(|name| self.filenames.contains(&name))
            || self.excludes_path(path)
    }

    /// Number of entries across all three sets
    pub fn len(&self) -> usize {
        self.hashes.len() + self.filenames.len() + self.directories.len()
    }

    /// Whether all three sets are empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
