//! JSON shapes returned by the Plex API and their conversion into domain types

use chrono::{DateTime, Local, TimeZone};
use reaper_domain::{Episode, HistoryEntry, Section};
use serde::Deserialize;
use std::path::PathBuf;

/// Top-level envelope of every Plex JSON response
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope {
    #[serde(rename = "MediaContainer")]
    pub media_container: MediaContainer,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct MediaContainer {
    #[serde(rename = "Directory", default)]
    pub directories: Vec<DirectoryEntry>,

    #[serde(rename = "Metadata", default)]
    pub metadata: Vec<MetadataEntry>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DirectoryEntry {
    pub key: String,
    pub title: String,
    #[serde(rename = "type", default)]
    pub kind: String,
}

/// A movie, show, episode, or history row; Plex uses one shape for all of them
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MetadataEntry {
    #[serde(default)]
    pub rating_key: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub added_at: Option<i64>,
    #[serde(default)]
    pub viewed_at: Option<i64>,
    #[serde(rename = "Media", default)]
    pub media: Vec<MediaEntry>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct MediaEntry {
    #[serde(rename = "Part", default)]
    pub parts: Vec<PartEntry>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PartEntry {
    #[serde(default)]
    pub file: Option<String>,
}

/// Convert a Unix timestamp in seconds to local time
pub(crate) fn local_time(secs: i64) -> Option<DateTime<Local>> {
    Local.timestamp_opt(secs, 0).single()
}

impl DirectoryEntry {
    pub fn into_section(self) -> Section {
        Section {
            key: self.key,
            title: self.title,
            kind: self.kind,
        }
    }
}

impl MetadataEntry {
    /// File paths of every media part
    pub fn part_paths(&self) -> Vec<PathBuf> {
        self.media
            .iter()
            .flat_map(|media| media.parts.iter())
            .filter_map(|part| part.file.as_deref())
            .map(PathBuf::from)
            .collect()
    }

    pub fn into_episode(self) -> Episode {
        Episode {
            parts: self.part_paths(),
            title: self.title,
        }
    }

    /// History rows without a usable timestamp are dropped
    pub fn history_entry(&self) -> Option<HistoryEntry> {
        self.viewed_at
            .and_then(local_time)
            .map(|viewed_at| HistoryEntry { viewed_at })
    }
}
