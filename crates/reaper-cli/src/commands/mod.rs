//! Command implementations.

pub mod classify;
pub mod run;

pub use self::classify::execute_classify;
pub use self::run::execute_run;

use crate::cli::ConnectionArgs;
use crate::config::Config;
use crate::error::Result;
use reaper_plex::PlexClient;
use reaper_rtorrent::RtorrentClient;

/// Build the Plex client from flags and the config file.
fn connect_library(args: &ConnectionArgs, config: &Config) -> Result<PlexClient> {
    let (url, token) = args.plex()?;
    Ok(PlexClient::with_timeout(url, token, config.http.timeout())?)
}

/// Build the rTorrent client from flags and the config file.
fn connect_download_client(args: &ConnectionArgs, config: &Config) -> Result<RtorrentClient> {
    Ok(RtorrentClient::with_timeout(args.rtorrent()?, config.http.timeout())?)
}
