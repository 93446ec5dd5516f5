//! Output formatting for the CLI.

use crate::error::Result;
use colored::*;
use reaper_janitor::{Classification, RunMetrics, RunReport, TorrentVerdict};
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Table format
    Table,
    /// JSON format
    Json,
    /// Quiet (paths only)
    Quiet,
}

impl From<crate::cli::CliFormat> for OutputFormat {
    fn from(format: crate::cli::CliFormat) -> Self {
        match format {
            crate::cli::CliFormat::Table => OutputFormat::Table,
            crate::cli::CliFormat::Json => OutputFormat::Json,
            crate::cli::CliFormat::Quiet => OutputFormat::Quiet,
        }
    }
}

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self { format, color_enabled }
    }

    /// Format the report of a cleanup pass.
    pub fn format_report(&self, report: &RunReport, metrics: &RunMetrics) -> Result<String> {
        match self.format {
            OutputFormat::Json => self.format_report_json(report),
            OutputFormat::Table => Ok(self.format_report_table(report, metrics)),
            OutputFormat::Quiet => Ok(self.format_report_quiet(report)),
        }
    }

    /// Format the unexpired filename set.
    pub fn format_classification(&self, classification: &Classification) -> Result<String> {
        let mut names: Vec<&String> = classification.unexpired_filenames.iter().collect();
        names.sort();

        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&serde_json::json!({
                "unexpired_filenames": names,
                "expired": classification.expired,
                "unexpired_items": classification.unexpired_items,
                "unclassifiable": classification.unclassifiable,
            }))?),
            OutputFormat::Quiet => Ok(names.iter().map(|n| n.as_str()).collect::<Vec<_>>().join("\n")),
            OutputFormat::Table => {
                if names.is_empty() {
                    return Ok(self.colorize("No protected files.", "yellow"));
                }
                let mut builder = Builder::default();
                builder.push_record(["Protected file"]);
                for name in &names {
                    builder.push_record([name.as_str()]);
                }
                let mut lines = vec![self.table(builder)];
                lines.push(self.info(&format!(
                    "{} item(s) unexpired, {} expired, {} unclassifiable",
                    classification.unexpired_items,
                    classification.expired.len(),
                    classification.unclassifiable
                )));
                Ok(lines.join("\n"))
            }
        }
    }

    fn format_report_json(&self, report: &RunReport) -> Result<String> {
        let torrents: Vec<serde_json::Value> = report
            .reconciliation
            .reports
            .iter()
            .map(|t| {
                serde_json::json!({
                    "hash": t.hash.as_str(),
                    "name": t.name,
                    "base_path": t.base_path.display().to_string(),
                    "size": t.size,
                    "verdict": t.verdict.label(),
                })
            })
            .collect();
        let removed: Vec<serde_json::Value> = report
            .sweep
            .removed
            .iter()
            .map(|f| {
                serde_json::json!({
                    "path": f.path.display().to_string(),
                    "size": f.size,
                })
            })
            .collect();
        let failures: Vec<serde_json::Value> = report
            .sweep
            .failures
            .iter()
            .map(|f| {
                serde_json::json!({
                    "path": f.path.display().to_string(),
                    "error": f.error,
                })
            })
            .collect();

        Ok(serde_json::to_string_pretty(&serde_json::json!({
            "dry_run": report.dry_run,
            "data_dir": report.data_dir.display().to_string(),
            "expired": report.classification.expired,
            "torrents": torrents,
            "removed": removed,
            "removal_failures": failures,
        }))?)
    }

    fn format_report_table(&self, report: &RunReport, metrics: &RunMetrics) -> String {
        let mut sections = Vec::new();

        if report.dry_run {
            sections.push(self.warning("Dry run: nothing was erased or removed"));
        }

        let acted: Vec<_> = report
            .reconciliation
            .reports
            .iter()
            .filter(|t| !matches!(t.verdict, TorrentVerdict::Kept { .. } | TorrentVerdict::Excluded { .. }))
            .collect();
        if acted.is_empty() {
            sections.push(self.colorize("No torrents erased or skipped.", "yellow"));
        } else {
            let mut builder = Builder::default();
            builder.push_record(["Torrent", "Base path", "Size", "Result"]);
            for torrent in acted {
                builder.push_record([
                    torrent.name.clone(),
                    torrent.base_path.display().to_string(),
                    human_bytes(torrent.size),
                    torrent.verdict.label().to_string(),
                ]);
            }
            sections.push(self.table(builder));
        }

        if report.sweep.removed.is_empty() {
            sections.push(self.colorize("No orphaned files.", "yellow"));
        } else {
            let mut builder = Builder::default();
            builder.push_record(["Orphaned file", "Size"]);
            for file in &report.sweep.removed {
                builder.push_record([file.path.display().to_string(), human_bytes(file.size)]);
            }
            sections.push(self.table(builder));
        }

        for failure in &report.sweep.failures {
            sections.push(self.error(&format!("{}: {}", failure.path.display(), failure.error)));
        }

        sections.push(metrics.summary());
        sections.push(self.success(&format!(
            "Pass complete: {} torrent(s) erased, {} file(s) removed",
            report.reconciliation.erased().filter(|(_, o)| o.client_erased()).count(),
            report.sweep.removed.len()
        )));

        sections.join("\n\n")
    }

    fn format_report_quiet(&self, report: &RunReport) -> String {
        report
            .reconciliation
            .erased()
            .filter(|(_, outcome)| outcome.client_erased())
            .map(|(torrent, _)| torrent.base_path.display().to_string())
            .chain(report.sweep.removed.iter().map(|f| f.path.display().to_string()))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn table(&self, builder: Builder) -> String {
        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));
        table.to_string()
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            _ => text.to_string(),
        }
    }
}

/// Render a byte count with a binary unit.
pub fn human_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} B", bytes)
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reaper_domain::TorrentHash;
    use reaper_janitor::{ErasureOutcome, Reconciliation, RemovedFile, SweepReport, TorrentReport};
    use std::collections::HashSet;
    use std::path::PathBuf;

    fn create_test_report() -> RunReport {
        RunReport {
            classification: Classification {
                unexpired_filenames: ["b.mp4".to_string()].into_iter().collect(),
                expired: vec!["A (2020)".to_string()],
                unexpired_items: 1,
                ..Default::default()
            },
            reconciliation: Reconciliation {
                unexpired_filepaths: HashSet::new(),
                reports: vec![
                    TorrentReport {
                        hash: TorrentHash::new("AAAA"),
                        name: "A.2020.1080p".to_string(),
                        base_path: PathBuf::from("/media/data/A.2020.1080p"),
                        size: 4 * 1024 * 1024 * 1024,
                        verdict: TorrentVerdict::Erased(ErasureOutcome::FullSuccess),
                    },
                    TorrentReport {
                        hash: TorrentHash::new("BBBB"),
                        name: "B".to_string(),
                        base_path: PathBuf::from("/media/data/B"),
                        size: 10,
                        verdict: TorrentVerdict::Kept {
                            matched: vec!["b.mp4".to_string()],
                            protected_files: 1,
                        },
                    },
                ],
            },
            data_dir: PathBuf::from("/media/data"),
            sweep: SweepReport {
                removed: vec![RemovedFile {
                    path: PathBuf::from("/media/data/stray.nfo"),
                    size: 12,
                }],
                ..Default::default()
            },
            dry_run: false,
        }
    }

    #[test]
    fn test_json_format() {
        let formatter = Formatter::new(OutputFormat::Json, false);
        let output = formatter.format_report(&create_test_report(), &RunMetrics::new()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(value["torrents"][0]["verdict"], "full_success");
        assert_eq!(value["torrents"][1]["verdict"], "kept");
        assert_eq!(value["removed"][0]["path"], "/media/data/stray.nfo");
        assert_eq!(value["expired"][0], "A (2020)");
    }

    #[test]
    fn test_quiet_format() {
        let formatter = Formatter::new(OutputFormat::Quiet, false);
        let output = formatter.format_report(&create_test_report(), &RunMetrics::new()).unwrap();
        assert_eq!(output, "/media/data/A.2020.1080p\n/media/data/stray.nfo");
    }

    #[test]
    fn test_table_format() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_report(&create_test_report(), &RunMetrics::new()).unwrap();

        assert!(output.contains("Torrent"));
        assert!(output.contains("A.2020.1080p"));
        assert!(output.contains("4.0 GiB"));
        assert!(output.contains("Orphaned file"));
        assert!(output.contains("1 torrent(s) erased, 1 file(s) removed"));
        // Kept torrents are not listed
        assert!(!output.contains("/media/data/B "));
    }

    #[test]
    fn test_dry_run_banner() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let mut report = create_test_report();
        report.dry_run = true;
        let output = formatter.format_report(&report, &RunMetrics::new()).unwrap();
        assert!(output.contains("Dry run"));
    }

    #[test]
    fn test_classification_quiet_is_sorted() {
        let formatter = Formatter::new(OutputFormat::Quiet, false);
        let classification = Classification {
            unexpired_filenames: ["z.mkv", "a.mkv"].iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        };
        assert_eq!(formatter.format_classification(&classification).unwrap(), "a.mkv\nz.mkv");
    }

    #[test]
    fn test_colorize_disabled() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        assert_eq!(formatter.success("test"), "✓ test");
    }

    #[test]
    fn test_human_bytes() {
        assert_eq!(human_bytes(512), "512 B");
        assert_eq!(human_bytes(1536), "1.5 KiB");
        assert_eq!(human_bytes(3 * 1024 * 1024), "3.0 MiB");
    }
}
