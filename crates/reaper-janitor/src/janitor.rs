//! Core Janitor implementation: one cleanup pass

use crate::classifier::{Classification, ExpirationClassifier};
use crate::reconciler::{ErasureOutcome, Reconciliation, TorrentReconciler, TorrentVerdict};
use crate::sweeper::{OrphanSweeper, SweepReport};
use crate::{ExclusionSet, JanitorConfig, JanitorError, RunMetrics};
use reaper_domain::traits::{DownloadClient, LibraryService};
use std::fmt::Display;
use std::path::PathBuf;
use std::time::Instant;

/// Everything one pass decided and did
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Library classification
    pub classification: Classification,

    /// Per-torrent decisions
    pub reconciliation: Reconciliation,

    /// Client default data directory that was swept
    pub data_dir: PathBuf,

    /// Orphan sweep results
    pub sweep: SweepReport,

    /// Whether this was a dry run
    pub dry_run: bool,
}

/// Janitor service for expiring watched media
///
/// Responsible for:
/// - Classifying library items as expired or not from their watch history
/// - Erasing torrents that hold nothing an unexpired item needs
/// - Sweeping files no kept torrent or unexpired item accounts for
/// - Collecting metrics on each pass
///
/// The stages run strictly in that order. A stage only starts once the one
/// before it has produced a complete result.
///
/// # Examples
///
/// ```no_run
/// use reaper_janitor::{ExclusionSet, Janitor, JanitorConfig};
/// use reaper_plex::PlexClient;
/// use reaper_rtorrent::RtorrentClient;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let library = PlexClient::new("http://localhost:32400", "token")?;
/// let client = RtorrentClient::new("http://localhost/RPC2")?;
/// let mut janitor = Janitor::new(JanitorConfig::new("/media/data"), ExclusionSet::builtin());
///
/// let report = janitor.run(&library, &client)?;
/// println!("{} files removed", report.sweep.removed.len());
/// println!("{}", janitor.metrics().summary());
/// # Ok(())
/// # }
/// ```
pub struct Janitor {
    config: JanitorConfig,
    exclusions: ExclusionSet,
    metrics: RunMetrics,
}

impl Janitor {
    /// Create a new Janitor with the given configuration and exclusions
    pub fn new(config: JanitorConfig, exclusions: ExclusionSet) -> Self {
        Self {
            config,
            exclusions,
            metrics: RunMetrics::new(),
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &JanitorConfig {
        &self.config
    }

    /// Get a reference to the current metrics
    pub fn metrics(&self) -> &RunMetrics {
        &self.metrics
    }

    /// Reset metrics counters
    pub fn reset_metrics(&mut self) {
        self.metrics.reset();
    }

    /// Classify the library without touching the download client or disk
    pub fn classify<L>(&self, library: &L) -> Result<Classification, JanitorError>
    where
        L: LibraryService,
        L::Error: Display,
    {
        ExpirationClassifier::new(self.config.threshold_days).classify(library)
    }

    /// Perform one complete pass
    ///
    /// 1. Compute the unexpired filename set from the library
    /// 2. Read the client's default data directory
    /// 3. Reconcile torrents, erasing those nothing needs
    /// 4. Sweep orphaned files under the data directory
    ///
    /// Any fatal error stops the pass before the next stage starts.
    pub fn run<L, C>(&mut self, library: &L, client: &C) -> Result<RunReport, JanitorError>
    where
        L: LibraryService,
        L::Error: Display,
        C: DownloadClient,
        C::Error: Display,
    {
        let start = Instant::now();
        self.config.validate()?;

        if self.config.dry_run {
            tracing::info!("DRY RUN: no torrent will be erased and no file removed");
        }

        let classification = self.classify(library)?;

        let data_dir = client
            .default_directory()
            .map_err(|e| JanitorError::DownloadClient(e.to_string()))?;

        let reconciliation = TorrentReconciler::new(&self.config, &self.exclusions)
            .reconcile(client, &classification.unexpired_filenames)?;

        let sweep = OrphanSweeper::new(&self.exclusions, self.config.threshold_days, self.config.dry_run)
            .sweep(
                &data_dir,
                &classification.unexpired_filenames,
                &reconciliation.unexpired_filepaths,
            )?;

        let report = RunReport {
            classification,
            reconciliation,
            data_dir,
            sweep,
            dry_run: self.config.dry_run,
        };

        self.record(&report);
        self.metrics.total_runtime_ms += start.elapsed().as_millis() as u64;

        Ok(report)
    }

    fn record(&mut self, report: &RunReport) {
        let metrics = &mut self.metrics;
        let classification = &report.classification;
        metrics.expired_items += classification.expired.len();
        metrics.unexpired_items += classification.unexpired_items;
        metrics.unclassifiable_items += classification.unclassifiable;
        metrics.unknown_kind_items += classification.unknown_kind;

        let reconciliation = &report.reconciliation;
        metrics.torrents_kept += reconciliation.count(|v| matches!(v, TorrentVerdict::Kept { .. }));
        metrics.torrents_excluded += reconciliation.count(|v| matches!(v, TorrentVerdict::Excluded { .. }));
        metrics.torrents_anomalous += reconciliation.count(TorrentVerdict::is_anomaly);
        for (torrent, outcome) in reconciliation.erased() {
            metrics.record_erasure(outcome.as_str());
            // Only a completed removal frees the torrent's bytes
            if matches!(outcome, ErasureOutcome::FullSuccess) {
                metrics.bytes_reclaimed += torrent.size;
            }
        }

        if !report.dry_run {
            for file in &report.sweep.removed {
                metrics.record_removal(file.size);
            }
        }
        metrics.removal_failures += report.sweep.failures.len();
        metrics.record_run();
    }
}
