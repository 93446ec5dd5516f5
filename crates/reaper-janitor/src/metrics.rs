//! Metrics collection for Janitor runs

use std::collections::HashMap;

/// Metrics collected during Janitor runs
///
/// Tracks classification counts, torrent verdicts, erasure outcomes, and
/// sweep results. Counters accumulate across runs until [`RunMetrics::reset`].
#[derive(Debug, Clone, Default)]
pub struct RunMetrics {
    /// Items found expired
    pub expired_items: usize,

    /// Items still within the threshold
    pub unexpired_items: usize,

    /// Items with no watch state at all
    pub unclassifiable_items: usize,

    /// Items of a kind that maps to no files
    pub unknown_kind_items: usize,

    /// Torrents kept because they share a file with an unexpired item
    pub torrents_kept: usize,

    /// Torrents kept because their hash is excluded
    pub torrents_excluded: usize,

    /// Torrents skipped because of a path or file anomaly
    pub torrents_anomalous: usize,

    /// Erasure attempts per outcome label
    pub erasures: HashMap<&'static str, usize>,

    /// Files removed by the orphan sweep
    pub files_removed: usize,

    /// Files the sweep failed to remove
    pub removal_failures: usize,

    /// Bytes freed by erasures and the sweep
    pub bytes_reclaimed: u64,

    /// Completed runs
    pub run_count: usize,

    /// Total runtime in milliseconds
    pub total_runtime_ms: u64,
}

impl RunMetrics {
    /// Create new empty metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an erasure attempt by its outcome label
    pub fn record_erasure(&mut self, outcome: &'static str) {
        *self.erasures.entry(outcome).or_insert(0) += 1;
    }

    /// Record a file removed by the sweep
    pub fn record_removal(&mut self, bytes: u64) {
        self.files_removed += 1;
        self.bytes_reclaimed += bytes;
    }

    /// Record a run completion
    pub fn record_run(&mut self) {
        self.run_count += 1;
    }

    /// Get total erasure attempts across all outcomes
    pub fn total_erasures(&self) -> usize {
        self.erasures.values().sum()
    }

    /// Reset all metrics
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Generate a summary report of metrics
    pub fn summary(&self) -> String {
        let mut lines = vec![
            "Reaper Run Summary".to_string(),
            "==================".to_string(),
            format!("Runs: {}", self.run_count),
            format!("Total runtime: {}ms", self.total_runtime_ms),
            String::new(),
            "Library items:".to_string(),
            format!("  Expired: {}", self.expired_items),
            format!("  Unexpired: {}", self.unexpired_items),
            format!("  Unclassifiable: {}", self.unclassifiable_items),
            format!("  Unknown kind: {}", self.unknown_kind_items),
            String::new(),
            "Torrents:".to_string(),
            format!("  Kept: {}", self.torrents_kept),
            format!("  Excluded: {}", self.torrents_excluded),
            format!("  Anomalous: {}", self.torrents_anomalous),
        ];

        if !self.erasures.is_empty() {
            lines.push(String::new());
            lines.push("Erasures by outcome:".to_string());
            let mut outcomes: Vec<_> = self.erasures.iter().collect();
            outcomes.sort();
            for (outcome, count) in outcomes {
                lines.push(format!("  {}: {}", outcome, count));
            }
            lines.push(format!("  Total: {}", self.total_erasures()));
        }

        lines.push(String::new());
        lines.push("Sweep:".to_string());
        lines.push(format!("  Files removed: {}", self.files_removed));
        lines.push(format!("  Removal failures: {}", self.removal_failures));
        lines.push(format!("  Bytes reclaimed: {}", self.bytes_reclaimed));

        lines.join("\n")
    }
}
