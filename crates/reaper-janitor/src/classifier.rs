//! Expiration classification
//!
//! Decides which library items are still wanted and turns them into the set of
//! case-folded basenames that the rest of the run must not delete.

use crate::JanitorError;
use chrono::{DateTime, Local};
use reaper_domain::filename::casefolded_basename;
use reaper_domain::traits::LibraryService;
use reaper_domain::{LibraryItem, MediaKind};
use std::collections::HashSet;
use std::fmt::Display;

/// Outcome of classifying a library
#[derive(Debug, Clone, Default)]
pub struct Classification {
    /// Case-folded basenames of every file owned by a non-expired item
    pub unexpired_filenames: HashSet<String>,

    /// Display names of the items found expired
    pub expired: Vec<String>,

    /// Number of items still within the threshold
    pub unexpired_items: usize,

    /// Items with neither history nor creation date
    pub unclassifiable: usize,

    /// Items whose kind maps to no files
    pub unknown_kind: usize,
}

/// Computes the unexpired filename set from watch history
#[derive(Debug, Clone, Copy)]
pub struct ExpirationClassifier {
    threshold_days: u32,
}

/// Whole days elapsed between `last_watched` and `now`, rounded down
///
/// Negative whenever `last_watched` lies in the future, even by a second.
pub fn days_since(last_watched: DateTime<Local>, now: DateTime<Local>) -> i64 {
    (now - last_watched).num_seconds().div_euclid(86_400)
}

impl ExpirationClassifier {
    /// Create a classifier for the given threshold
    pub fn new(threshold_days: u32) -> Self {
        Self { threshold_days }
    }

    /// Whether an item last watched at `last_watched` is expired at `now`
    ///
    /// The boundary is inclusive: exactly `threshold_days` days is expired.
    pub fn is_expired(&self, last_watched: DateTime<Local>, now: DateTime<Local>) -> bool {
        days_since(last_watched, now) >= i64::from(self.threshold_days)
    }

    /// Fetch every item and its history from the library and classify them now
    ///
    /// Any library failure aborts: a partial unexpired set would let later
    /// stages delete files that are still wanted.
    pub fn classify<L>(&self, library: &L) -> Result<Classification, JanitorError>
    where
        L: LibraryService,
        L::Error: Display,
    {
        let items = fetch_items(library)?;
        Ok(self.classify_items(&items, Local::now()))
    }

    /// Classify items whose history is already populated
    pub fn classify_items(&self, items: &[LibraryItem], now: DateTime<Local>) -> Classification {
        let mut classification = Classification::default();

        for item in items {
            let Some(last_watched) = item.last_watched() else {
                classification.unclassifiable += 1;
                tracing::warn!(title = %item, "No watch history or creation date, skipping");
                continue;
            };

            if let MediaKind::Unknown(kind) = &item.kind {
                classification.unknown_kind += 1;
                tracing::debug!(title = %item, kind = %kind, "Item kind has no media files");
            }

            let days = days_since(last_watched, now);
            if self.is_expired(last_watched, now) {
                tracing::info!(
                    title = %item,
                    days_since_watched = days,
                    threshold_days = self.threshold_days,
                    "expired: {}",
                    item
                );
                classification.expired.push(item.to_string());
                continue;
            }

            classification.unexpired_items += 1;
            for path in item.associated_paths() {
                if let Some(name) = casefolded_basename(&path) {
                    classification.unexpired_filenames.insert(name);
                }
            }
        }

        tracing::info!(
            expired = classification.expired.len(),
            unexpired = classification.unexpired_items,
            unclassifiable = classification.unclassifiable,
            protected_filenames = classification.unexpired_filenames.len(),
            "Classification complete"
        );

        classification
    }
}

/// List every item in every section, with history attached
fn fetch_items<L>(library: &L) -> Result<Vec<LibraryItem>, JanitorError>
where
    L: LibraryService,
    L::Error: Display,
{
    let library_error = |e: L::Error| JanitorError::Library(e.to_string());
    let mut items = Vec::new();

    for section in library.sections().map_err(library_error)? {
        tracing::debug!(section = %section.title, "Listing section");
        for mut item in library.items(&section).map_err(library_error)? {
            item.history = library.history(&item).map_err(library_error)?;
            items.push(item);
        }
    }

    Ok(items)
}
