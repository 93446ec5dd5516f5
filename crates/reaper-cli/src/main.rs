//! Reaper - expire watched media from a Plex + rTorrent seedbox.

use anyhow::Context;
use clap::Parser;
use reaper_cli::{commands, logging, Cli, Command, Config, Formatter, OutputFormat};

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref()).context("failed to load configuration")?;

    let filter = logging::build_filter(cli.log_level.as_deref(), config.logging.level.as_deref())?;
    let log_file = cli.log_file.clone().or_else(|| config.logging.file.clone());
    let _guard = logging::init_logging(filter, log_file.as_deref()).context("failed to initialize logging")?;

    let format = cli.format.map(Into::into).unwrap_or(OutputFormat::Table);
    let formatter = Formatter::new(format, !cli.no_color);

    match cli.command {
        None | Some(Command::Run) => {
            commands::execute_run(&cli.connection, &config, cli.dry_run, &formatter).context("cleanup pass aborted")?;
        }
        Some(Command::Classify) => {
            commands::execute_classify(&cli.connection, &config, &formatter).context("classification failed")?;
        }
    }

    Ok(())
}
