//! Logging setup.
//!
//! Every decision is logged to stdout and, when a log file is configured,
//! appended to that file as well. Lines carry the subscriber's UTC timestamp.

use crate::error::{CliError, Result};
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Default log filter.
pub const DEFAULT_LEVEL: &str = "info";

/// Build the log filter.
///
/// An explicit `--log-level` wins, then `RUST_LOG`, then the config file,
/// then [`DEFAULT_LEVEL`].
pub fn build_filter(cli_level: Option<&str>, config_level: Option<&str>) -> Result<EnvFilter> {
    if let Some(level) = cli_level {
        return EnvFilter::try_new(level).map_err(|e| CliError::Logging(format!("invalid log level '{}': {}", level, e)));
    }
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    let level = config_level.unwrap_or(DEFAULT_LEVEL);
    EnvFilter::try_new(level).map_err(|e| CliError::Logging(format!("invalid log level '{}': {}", level, e)))
}

/// Split a log file path into its directory and file name.
pub fn split_log_path(path: &Path) -> Result<(PathBuf, String)> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| CliError::Logging(format!("log file '{}' has no file name", path.display())))?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    Ok((dir, name.to_string()))
}

/// Initialize logging. Call once at startup.
///
/// Returns the guard for the non-blocking file writer, which must stay alive
/// until the process exits or buffered lines are lost.
pub fn init_logging(filter: EnvFilter, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let console_layer = fmt::layer().with_target(false);

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let (dir, name) = split_log_path(path)?;
            std::fs::create_dir_all(&dir)?;
            let appender = RollingFileAppender::builder()
                .rotation(Rotation::NEVER)
                .filename_prefix(name)
                .build(&dir)
                .map_err(|e| CliError::Logging(format!("cannot open log file '{}': {}", path.display(), e)))?;
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| CliError::Logging(e.to_string()))?;

    Ok(guard)
}
