//! Run command implementation.

use super::{connect_download_client, connect_library};
use crate::cli::ConnectionArgs;
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use reaper_janitor::{Janitor, JanitorConfig};

/// Build the janitor configuration for a pass.
pub fn janitor_config(args: &ConnectionArgs, config: &Config, dry_run: bool) -> Result<JanitorConfig> {
    let janitor_config = JanitorConfig {
        threshold_days: args.days,
        download_view: config.rtorrent.view.clone(),
        dry_run,
        ..JanitorConfig::new(args.data_root()?)
    };
    janitor_config.validate()?;
    Ok(janitor_config)
}

/// Execute one cleanup pass.
pub fn execute_run(args: &ConnectionArgs, config: &Config, dry_run: bool, formatter: &Formatter) -> Result<()> {
    let janitor_config = janitor_config(args, config, dry_run)?;
    let library = connect_library(args, config)?;
    let client = connect_download_client(args, config)?;

    tracing::info!(
        threshold_days = janitor_config.threshold_days,
        data_root = %janitor_config.data_root.display(),
        rtorrent = %client.endpoint(),
        dry_run,
        "Starting pass"
    );

    let mut janitor = Janitor::new(janitor_config, config.exclusion_set());
    let report = janitor.run(&library, &client)?;

    println!("{}", formatter.format_report(&report, janitor.metrics())?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CliError;
    use std::path::PathBuf;

    fn args(data_root: Option<&str>) -> ConnectionArgs {
        ConnectionArgs {
            days: 21,
            plex_url: Some("http://plex:32400".to_string()),
            plex_token: Some("token".to_string()),
            rtorrent_url: Some("http://seedbox/RPC2".to_string()),
            data_root: data_root.map(PathBuf::from),
        }
    }

    #[test]
    fn test_janitor_config_from_flags_and_file() {
        let mut config = Config::default();
        config.rtorrent.view = "seeding".to_string();

        let janitor_config = janitor_config(&args(Some("/media/data")), &config, true).unwrap();

        assert_eq!(janitor_config.threshold_days, 21);
        assert_eq!(janitor_config.download_view, "seeding");
        assert_eq!(janitor_config.data_root, PathBuf::from("/media/data"));
        assert!(janitor_config.dry_run);
    }

    #[test]
    fn test_missing_data_root_is_fatal() {
        let result = janitor_config(&args(None), &Config::default(), false);
        assert!(matches!(result, Err(CliError::Config(_))));
    }

    #[test]
    fn test_relative_data_root_is_fatal() {
        let result = janitor_config(&args(Some("media/data")), &Config::default(), false);
        assert!(matches!(result, Err(CliError::Janitor(_))));
    }
}
