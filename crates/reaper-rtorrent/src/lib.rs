//! Reaper rTorrent Layer
//!
//! Implementation of the `DownloadClient` trait from `reaper-domain` over
//! rTorrent's XML-RPC interface.
//!
//! # Examples
//!
//! ```no_run
//! use reaper_domain::traits::DownloadClient;
//! use reaper_rtorrent::RtorrentClient;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = RtorrentClient::new("http://localhost:8000/RPC2")?;
//! for hash in client.download_list("main")? {
//!     println!("{} {}", hash, client.name(&hash)?);
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod client;
pub mod xmlrpc;

use thiserror::Error;

pub use client::RtorrentClient;
pub use xmlrpc::Value;

/// Errors that can occur talking to rTorrent
#[derive(Error, Debug)]
pub enum RtorrentError {
    /// Network or HTTP communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Response was not a well-formed XML-RPC document
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The server answered with an XML-RPC fault
    #[error("XML-RPC fault {code}: {message}")]
    Fault {
        /// Fault code reported by the server
        code: i64,
        /// Fault message reported by the server
        message: String,
    },
}

impl From<reqwest::Error> for RtorrentError {
    fn from(e: reqwest::Error) -> Self {
        match e.status() {
            Some(status) => RtorrentError::Communication(format!("HTTP {}: {}", status, e)),
            None => RtorrentError::Communication(e.to_string()),
        }
    }
}
