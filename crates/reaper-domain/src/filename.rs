//! Filename helpers
//!
//! The library, the download client, and the filesystem each name files
//! differently. The only key they reliably share is the bare filename, so all
//! cross-source matching is done on case-folded basenames.

use std::path::Path;

/// Fold a name for case-insensitive comparison
///
/// # Examples
///
/// ```
/// use reaper_domain::filename::casefold;
///
/// assert_eq!(casefold("Movie.MKV"), "movie.mkv");
/// ```
pub fn casefold(name: &str) -> String {
    name.to_lowercase()
}

/// Get the final component of a path as UTF-8, if it has one
pub fn basename(path: &Path) -> Option<&str> {
    path.file_name().and_then(|name| name.to_str())
}

/// Get the case-folded final component of a path
///
/// # Examples
///
/// ```
/// use reaper_domain::filename::casefolded_basename;
/// use std::path::Path;
///
/// let name = casefolded_basename(Path::new("/media/Show/S01E01.MKV"));
/// assert_eq!(name.as_deref(), Some("s01e01.mkv"));
/// ```
pub fn casefolded_basename(path: &Path) -> Option<String> {
    basename(path).map(casefold)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_casefold_unicode() {
        assert_eq!(casefold("ÉPISODE.mkv"), "épisode.mkv");
    }

    #[test]
    fn test_basename_of_directory_path() {
        assert_eq!(basename(Path::new("/data/Show Name")), Some("Show Name"));
    }

    #[test]
    fn test_basename_of_root() {
        assert_eq!(basename(Path::new("/")), None);
        assert_eq!(casefolded_basename(Path::new("")), None);
    }
}
