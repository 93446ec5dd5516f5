//! Torrent module - download client identifiers

use crate::filename::casefold;
use std::fmt;

/// Info-hash identifying an active download
///
/// The download client reports hashes in upper-case hex; the value is kept
/// exactly as reported so it can be sent back verbatim.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TorrentHash(String);

impl TorrentHash {
    /// Wrap a hash string as reported by the client
    pub fn new(hash: impl Into<String>) -> Self {
        Self(hash.into())
    }

    /// Get the hash as reported
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Get the case-folded hash, for exclusion lookups
    ///
    /// # Examples
    ///
    /// ```
    /// use reaper_domain::TorrentHash;
    ///
    /// let hash = TorrentHash::new("ABCDEF0123");
    /// assert_eq!(hash.casefolded(), "abcdef0123");
    /// ```
    pub fn casefolded(&self) -> String {
        casefold(&self.0)
    }
}

impl fmt::Display for TorrentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TorrentHash {
    fn from(hash: &str) -> Self {
        Self::new(hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_preserves_reported_case() {
        let hash = TorrentHash::from("DEADBEEF");
        assert_eq!(hash.as_str(), "DEADBEEF");
        assert_eq!(hash.to_string(), "DEADBEEF");
        assert_eq!(hash.casefolded(), "deadbeef");
    }
}
