//! Classify command implementation.

use super::connect_library;
use crate::cli::ConnectionArgs;
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use reaper_janitor::ExpirationClassifier;

/// Execute the classify command.
///
/// Only the library is contacted; nothing is erased or removed.
pub fn execute_classify(args: &ConnectionArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let library = connect_library(args, config)?;
    let classification = ExpirationClassifier::new(args.days).classify(&library)?;

    println!("{}", formatter.format_classification(&classification)?);
    Ok(())
}
