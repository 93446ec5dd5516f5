//! Library module - media items and their watch history

use chrono::{DateTime, Local};
use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;

/// A library section (e.g. "Movies", "TV Shows")
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    /// Section key used to address it on the media server
    pub key: String,

    /// Human-readable section title
    pub title: String,

    /// Section type as reported by the server ("movie", "show", "artist", ...)
    pub kind: String,
}

/// A single playback record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryEntry {
    /// When the item was viewed
    pub viewed_at: DateTime<Local>,
}

/// One episode of a show and the files backing it
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Episode {
    /// Episode title
    pub title: String,

    /// Media part file paths
    pub parts: Vec<PathBuf>,
}

/// How a library item maps to files on disk
///
/// Kinds the media server reports that are neither shows nor movies end up as
/// `Unknown`. They contribute no paths, so their files are never protected by
/// watch history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaKind {
    /// A show: files are the union of every episode's media parts
    Show {
        /// All episodes of the show
        episodes: Vec<Episode>,
    },

    /// A movie: files are its own media parts
    Movie {
        /// Media part file paths
        parts: Vec<PathBuf>,
    },

    /// Anything else, with the server-reported type name
    Unknown(String),
}

impl MediaKind {
    /// Get the kind name as a string
    pub fn as_str(&self) -> &str {
        match self {
            MediaKind::Show { .. } => "show",
            MediaKind::Movie { .. } => "movie",
            MediaKind::Unknown(kind) => kind,
        }
    }

    /// All media file paths associated with this kind
    pub fn paths(&self) -> BTreeSet<PathBuf> {
        match self {
            MediaKind::Show { episodes } => episodes
                .iter()
                .flat_map(|episode| episode.parts.iter().cloned())
                .collect(),
            MediaKind::Movie { parts } => parts.iter().cloned().collect(),
            MediaKind::Unknown(_) => BTreeSet::new(),
        }
    }
}

/// A movie or show tracked by the media server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryItem {
    /// Server-side identifier (rating key)
    pub key: String,

    /// Display title
    pub title: String,

    /// Release year, when known
    pub year: Option<i32>,

    /// Kind and associated files
    pub kind: MediaKind,

    /// When the item was added to the library
    pub added_at: Option<DateTime<Local>>,

    /// Playback history, in whatever order the server returned it
    pub history: Vec<HistoryEntry>,
}

impl LibraryItem {
    /// All media file paths associated with this item
    pub fn associated_paths(&self) -> BTreeSet<PathBuf> {
        self.kind.paths()
    }

    /// The moment this item was last touched
    ///
    /// This is the latest `viewed_at` in the history, or `added_at` when the
    /// history is empty. `None` means the item cannot be classified.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::{Local, TimeZone};
    /// use reaper_domain::{HistoryEntry, LibraryItem, MediaKind};
    ///
    /// let added = Local.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    /// let viewed = Local.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
    /// let item = LibraryItem {
    ///     key: "1".into(),
    ///     title: "Example".into(),
    ///     year: None,
    ///     kind: MediaKind::Movie { parts: vec![] },
    ///     added_at: Some(added),
    ///     history: vec![HistoryEntry { viewed_at: viewed }],
    /// };
    /// assert_eq!(item.last_watched(), Some(viewed));
    /// ```
    pub fn last_watched(&self) -> Option<DateTime<Local>> {
        match self.history.iter().map(|entry| entry.viewed_at).max() {
            Some(viewed_at) => Some(viewed_at),
            None => self.added_at,
        }
    }
}

impl fmt::Display for LibraryItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.year {
            Some(year) => write!(f, "{} ({})", self.title, year),
            None => write!(f, "{}", self.title),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(day: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 5, day, 12, 0, 0).unwrap()
    }

    fn item(kind: MediaKind, added_at: Option<DateTime<Local>>, viewed: &[u32]) -> LibraryItem {
        LibraryItem {
            key: "42".to_string(),
            title: "Item".to_string(),
            year: Some(2020),
            kind,
            added_at,
            history: viewed
                .iter()
                .map(|day| HistoryEntry { viewed_at: at(*day) })
                .collect(),
        }
    }

    #[test]
    fn test_show_paths_union_over_episodes() {
        let kind = MediaKind::Show {
            episodes: vec![
                Episode {
                    title: "Pilot".to_string(),
                    parts: vec![PathBuf::from("/media/s01e01.mkv")],
                },
                Episode {
                    title: "Second".to_string(),
                    parts: vec![
                        PathBuf::from("/media/s01e02.mkv"),
                        PathBuf::from("/media/s01e01.mkv"),
                    ],
                },
            ],
        };

        let paths = kind.paths();
        assert_eq!(paths.len(), 2);
        assert!(paths.contains(&PathBuf::from("/media/s01e02.mkv")));
    }

    #[test]
    fn test_unknown_kind_has_no_paths() {
        let kind = MediaKind::Unknown("artist".to_string());
        assert!(kind.paths().is_empty());
        assert_eq!(kind.as_str(), "artist");
    }

    #[test]
    fn test_last_watched_uses_added_at_without_history() {
        let movie = item(MediaKind::Movie { parts: vec![] }, Some(at(3)), &[]);
        assert_eq!(movie.last_watched(), Some(at(3)));
    }

    #[test]
    fn test_last_watched_is_latest_entry_not_first() {
        let movie = item(MediaKind::Movie { parts: vec![] }, Some(at(1)), &[4, 20, 9]);
        assert_eq!(movie.last_watched(), Some(at(20)));
    }

    #[test]
    fn test_history_wins_over_later_added_at() {
        let added = at(25) + Duration::days(1);
        let movie = item(MediaKind::Movie { parts: vec![] }, Some(added), &[2]);
        assert_eq!(movie.last_watched(), Some(at(2)));
    }

    #[test]
    fn test_unclassifiable_item() {
        let movie = item(MediaKind::Movie { parts: vec![] }, None, &[]);
        assert_eq!(movie.last_watched(), None);
    }

    #[test]
    fn test_display_with_and_without_year() {
        let mut movie = item(MediaKind::Movie { parts: vec![] }, None, &[]);
        assert_eq!(movie.to_string(), "Item (2020)");
        movie.year = None;
        assert_eq!(movie.to_string(), "Item");
    }
}
