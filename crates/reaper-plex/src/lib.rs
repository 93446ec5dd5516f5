//! Reaper Plex Layer
//!
//! Implementation of the `LibraryService` trait from `reaper-domain` against a
//! Plex Media Server.
//!
//! # Examples
//!
//! ```no_run
//! use reaper_domain::traits::LibraryService;
//! use reaper_plex::PlexClient;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let plex = PlexClient::new("http://localhost:32400", "token")?;
//! for section in plex.sections()? {
//!     println!("{} ({})", section.title, section.kind);
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod client;
mod models;

use thiserror::Error;

pub use client::PlexClient;

/// Errors that can occur talking to the media server
#[derive(Error, Debug)]
pub enum PlexError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// The server rejected the access token
    #[error("Unauthorized: check the Plex token")]
    Unauthorized,

    /// Response body did not have the expected shape
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for PlexError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            PlexError::InvalidResponse(e.to_string())
        } else {
            match e.status() {
                Some(reqwest::StatusCode::UNAUTHORIZED) => PlexError::Unauthorized,
                Some(status) => PlexError::Communication(format!("HTTP {}: {}", status, e)),
                None => PlexError::Communication(e.to_string()),
            }
        }
    }
}
