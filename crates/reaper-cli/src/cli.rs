//! CLI command definitions and argument parsing.

use crate::error::{CliError, Result};
use clap::{Args, Parser, Subcommand};
use reaper_janitor::config::DEFAULT_THRESHOLD_DAYS;
use std::path::PathBuf;

/// Reaper - expire watched media from a Plex + rTorrent seedbox.
#[derive(Debug, Parser)]
#[command(name = "reaper")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format for the end-of-run report
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path (default: <config dir>/reaper/config.toml)
    #[arg(short, long, global = true, env = "REAPER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log filter, e.g. "info" or "reaper_janitor=debug" (overrides RUST_LOG)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Append log lines to this file as well as stdout
    #[arg(long, global = true, env = "REAPER_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    /// Decide and log everything, but erase and remove nothing
    #[arg(long, global = true)]
    pub dry_run: bool,

    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (paths only)
    Quiet,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run one cleanup pass (default)
    Run,

    /// Print the filenames protected by unexpired library items, then exit
    Classify,
}

/// Service endpoints and the expiry policy.
#[derive(Debug, Clone, Args)]
pub struct ConnectionArgs {
    /// Days since last watch at which an item expires
    #[arg(short, long, global = true, env = "REAPER_DAYS", default_value_t = DEFAULT_THRESHOLD_DAYS)]
    pub days: u32,

    /// Plex server URL (e.g., http://localhost:32400)
    #[arg(long, global = true, env = "PLEX_URL")]
    pub plex_url: Option<String>,

    /// Plex authentication token
    #[arg(long, global = true, env = "PLEX_TOKEN", hide_env_values = true)]
    pub plex_token: Option<String>,

    /// rTorrent XML-RPC URL (e.g., http://localhost/RPC2)
    #[arg(long, global = true, env = "RTORRENT_URL")]
    pub rtorrent_url: Option<String>,

    /// Root of the managed download tree
    #[arg(long, global = true, env = "REAPER_DATA_ROOT")]
    pub data_root: Option<PathBuf>,
}

impl ConnectionArgs {
    /// Plex URL and token, both required
    pub fn plex(&self) -> Result<(&str, &str)> {
        Ok((
            required(&self.plex_url, "--plex-url", "PLEX_URL")?,
            required(&self.plex_token, "--plex-token", "PLEX_TOKEN")?,
        ))
    }

    /// rTorrent RPC URL, required
    pub fn rtorrent(&self) -> Result<&str> {
        required(&self.rtorrent_url, "--rtorrent-url", "RTORRENT_URL")
    }

    /// Managed data root, required
    pub fn data_root(&self) -> Result<&PathBuf> {
        self.data_root.as_ref().ok_or_else(|| missing("--data-root", "REAPER_DATA_ROOT"))
    }
}

fn required<'a>(value: &'a Option<String>, flag: &str, env: &str) -> Result<&'a str> {
    match value.as_deref() {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(missing(flag, env)),
    }
}

fn missing(flag: &str, env: &str) -> CliError {
    CliError::Config(format!("missing required setting: pass {} or set {}", flag, env))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_run_with_thirty_days() {
        let cli = Cli::try_parse_from(["reaper"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.connection.days, 30);
        assert!(!cli.dry_run);
    }

    #[test]
    fn test_parse_full_command_line() {
        let cli = Cli::try_parse_from([
            "reaper",
            "run",
            "--days",
            "14",
            "--plex-url",
            "http://plex:32400",
            "--plex-token",
            "secret",
            "--rtorrent-url",
            "http://seedbox/RPC2",
            "--data-root",
            "/media/data",
            "--dry-run",
            "--format",
            "json",
        ])
        .unwrap();

        assert!(matches!(cli.command, Some(Command::Run)));
        assert_eq!(cli.connection.days, 14);
        assert_eq!(cli.connection.plex().unwrap(), ("http://plex:32400", "secret"));
        assert_eq!(cli.connection.rtorrent().unwrap(), "http://seedbox/RPC2");
        assert_eq!(cli.connection.data_root().unwrap(), &PathBuf::from("/media/data"));
        assert!(cli.dry_run);
        assert!(matches!(cli.format, Some(CliFormat::Json)));
    }

    #[test]
    fn test_missing_required_setting_names_flag_and_env() {
        let args = ConnectionArgs {
            days: 30,
            plex_url: Some("http://plex:32400".to_string()),
            plex_token: None,
            rtorrent_url: Some(String::new()),
            data_root: None,
        };

        let err = args.plex().unwrap_err().to_string();
        assert!(err.contains("--plex-token"));
        assert!(err.contains("PLEX_TOKEN"));
        assert!(args.rtorrent().is_err());
        assert!(args.data_root().is_err());
    }

    #[test]
    fn test_rejects_negative_days() {
        assert!(Cli::try_parse_from(["reaper", "--days", "-3"]).is_err());
    }
}
