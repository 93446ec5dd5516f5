//! rTorrent XML-RPC client

use crate::xmlrpc::{decode_response, encode_call, Value};
use crate::RtorrentError;
use reaper_domain::traits::DownloadClient;
use reaper_domain::TorrentHash;
use std::path::PathBuf;
use std::time::Duration;

/// Default timeout for RPC calls (30 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Blocking XML-RPC client for rTorrent
///
/// The endpoint is the HTTP URL the RPC socket is published at, usually via
/// the web server that fronts rTorrent (e.g. `http://localhost/RPC2`).
pub struct RtorrentClient {
    endpoint: String,
    client: reqwest::blocking::Client,
}

impl RtorrentClient {
    /// Create a new client with the default timeout
    pub fn new(endpoint: impl Into<String>) -> Result<Self, RtorrentError> {
        Self::with_timeout(endpoint, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a new client with an explicit call timeout
    pub fn with_timeout(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, RtorrentError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RtorrentError::Communication(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: endpoint.into(),
            client,
        })
    }

    /// Get the RPC endpoint
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Perform a raw XML-RPC call
    pub fn call(&self, method: &str, params: &[Value]) -> Result<Value, RtorrentError> {
        tracing::debug!(method, "XML-RPC call");

        let body = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::CONTENT_TYPE, "text/xml")
            .body(encode_call(method, params))
            .send()?
            .error_for_status()?
            .text()?;

        decode_response(&body)
    }

    fn call_string(&self, method: &str, params: &[Value]) -> Result<String, RtorrentError> {
        match self.call(method, params)? {
            Value::String(s) => Ok(s),
            other => Err(RtorrentError::InvalidResponse(format!(
                "{} returned {:?}, expected a string",
                method, other
            ))),
        }
    }
}

impl DownloadClient for RtorrentClient {
    type Error = RtorrentError;

    fn download_list(&self, view: &str) -> Result<Vec<TorrentHash>, Self::Error> {
        let values = self
            .call("download_list", &[Value::from(""), Value::from(view)])?
            .into_array()
            .ok_or_else(|| RtorrentError::InvalidResponse("download_list did not return an array".into()))?;

        values
            .into_iter()
            .map(|value| match value {
                Value::String(hash) => Ok(TorrentHash::new(hash)),
                other => Err(RtorrentError::InvalidResponse(format!(
                    "download_list entry {:?} is not a hash",
                    other
                ))),
            })
            .collect()
    }

    fn name(&self, hash: &TorrentHash) -> Result<String, Self::Error> {
        self.call_string("d.name", &[Value::from(hash.as_str())])
    }

    fn base_path(&self, hash: &TorrentHash) -> Result<PathBuf, Self::Error> {
        self.call_string("d.base_path", &[Value::from(hash.as_str())])
            .map(PathBuf::from)
    }

    fn erase(&self, hash: &TorrentHash) -> Result<i64, Self::Error> {
        let value = self.call("d.erase", &[Value::from(hash.as_str())])?;
        value.as_i64().ok_or_else(|| {
            RtorrentError::InvalidResponse(format!("d.erase returned {:?}, expected an integer", value))
        })
    }

    fn default_directory(&self) -> Result<PathBuf, Self::Error> {
        self.call_string("directory.default", &[]).map(PathBuf::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = RtorrentClient::new("http://localhost/RPC2").unwrap();
        assert_eq!(client.endpoint(), "http://localhost/RPC2");
    }

    #[test]
    fn test_unreachable_endpoint() {
        let client =
            RtorrentClient::with_timeout("http://127.0.0.1:1/RPC2", Duration::from_secs(2)).unwrap();

        match client.default_directory() {
            Err(RtorrentError::Communication(_)) => {} // Expected
            other => panic!("Expected Communication error, got {:?}", other),
        }
    }
}
