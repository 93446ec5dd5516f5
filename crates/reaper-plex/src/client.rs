//! Plex Media Server client
//!
//! Talks to the server's JSON API with blocking requests. Every request carries
//! the access token in the `X-Plex-Token` header.

use crate::models::{local_time, DirectoryEntry, Envelope, MetadataEntry};
use crate::PlexError;
use reaper_domain::traits::LibraryService;
use reaper_domain::{HistoryEntry, LibraryItem, MediaKind, Section};
use std::time::Duration;

/// Default timeout for API requests (30 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Blocking client for a Plex Media Server
pub struct PlexClient {
    base_url: String,
    token: String,
    client: reqwest::blocking::Client,
}

impl PlexClient {
    /// Create a new client with the default timeout
    ///
    /// # Parameters
    ///
    /// - `base_url`: server URL (e.g., "http://localhost:32400")
    /// - `token`: Plex access token
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Result<Self, PlexError> {
        Self::with_timeout(base_url, token, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a new client with an explicit request timeout
    pub fn with_timeout(
        base_url: impl Into<String>,
        token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, PlexError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PlexError::Communication(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
            client,
        })
    }

    /// Get the server URL this client talks to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<Envelope, PlexError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(url = %url, "Plex request");

        let response = self
            .client
            .get(&url)
            .query(query)
            .header("X-Plex-Token", &self.token)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()?
            .error_for_status()?;

        Ok(response.json::<Envelope>()?)
    }

    fn episodes(&self, rating_key: &str) -> Result<Vec<MetadataEntry>, PlexError> {
        let path = format!("/library/metadata/{}/allLeaves", rating_key);
        Ok(self.get(&path, &[])?.media_container.metadata)
    }

    fn to_item(&self, entry: MetadataEntry) -> Result<LibraryItem, PlexError> {
        let key = entry.rating_key.clone().ok_or_else(|| {
            PlexError::InvalidResponse(format!("Item '{}' has no ratingKey", entry.title))
        })?;

        let kind = match entry.kind.as_str() {
            "movie" => MediaKind::Movie {
                parts: entry.part_paths(),
            },
            "show" => MediaKind::Show {
                episodes: self
                    .episodes(&key)?
                    .into_iter()
                    .map(MetadataEntry::into_episode)
                    .collect(),
            },
            other => MediaKind::Unknown(other.to_string()),
        };

        Ok(LibraryItem {
            key,
            title: entry.title,
            year: entry.year,
            kind,
            added_at: entry.added_at.and_then(local_time),
            history: Vec::new(),
        })
    }
}

impl LibraryService for PlexClient {
    type Error = PlexError;

    fn sections(&self) -> Result<Vec<Section>, Self::Error> {
        let envelope = self.get("/library/sections", &[])?;
        Ok(envelope
            .media_container
            .directories
            .into_iter()
            .map(DirectoryEntry::into_section)
            .collect())
    }

    fn items(&self, section: &Section) -> Result<Vec<LibraryItem>, Self::Error> {
        let path = format!("/library/sections/{}/all", section.key);
        self.get(&path, &[])?
            .media_container
            .metadata
            .into_iter()
            .map(|entry| self.to_item(entry))
            .collect()
    }

    fn history(&self, item: &LibraryItem) -> Result<Vec<HistoryEntry>, Self::Error> {
        let envelope = self.get(
            "/status/sessions/history/all",
            &[("metadataItemID", item.key.as_str())],
        )?;
        Ok(envelope
            .media_container
            .metadata
            .iter()
            .filter_map(MetadataEntry::history_entry)
            .collect())
    }
}
