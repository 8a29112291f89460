use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, info};

use crate::results::WalkStats;

/// Traversal counters shared by every task of one search
#[derive(Debug, Default)]
pub struct WalkMetrics {
    dirs_scanned: AtomicU64,
    entries_seen: AtomicU64,
    read_errors: AtomicU64,
    stat_errors: AtomicU64,
    dirs_cut_short: AtomicU64,
}

impl WalkMetrics {
    /// Creates a new WalkMetrics instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a directory that was opened for listing
    pub fn record_dir_scanned(&self) {
        self.dirs_scanned.fetch_add(1, Ordering::Relaxed);
    }

    /// Records one examined directory entry
    pub fn record_entry(&self) {
        self.entries_seen.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a directory that could not be opened
    pub fn record_read_error(&self) {
        let total = self.read_errors.fetch_add(1, Ordering::Relaxed) + 1;
        debug!("Directory read errors so far: {}", total);
    }

    /// Records an entry whose metadata could not be read
    pub fn record_stat_error(&self) {
        let total = self.stat_errors.fetch_add(1, Ordering::Relaxed) + 1;
        debug!("Metadata errors so far: {}", total);
    }

    /// Records a listing abandoned because the match limit was reached
    pub fn record_cut_short(&self) {
        self.dirs_cut_short.fetch_add(1, Ordering::Relaxed);
    }

    /// Takes a consistent-enough snapshot of the counters
    pub fn snapshot(&self, peak_active: usize) -> WalkStats {
        WalkStats {
            dirs_scanned: self.dirs_scanned.load(Ordering::Relaxed),
            entries_seen: self.entries_seen.load(Ordering::Relaxed),
            read_errors: self.read_errors.load(Ordering::Relaxed),
            stat_errors: self.stat_errors.load(Ordering::Relaxed),
            dirs_cut_short: self.dirs_cut_short.load(Ordering::Relaxed),
            peak_active,
        }
    }

    /// Logs the walk statistics
    pub fn log_stats(&self, peak_active: usize, elapsed: Duration) {
        let stats = self.snapshot(peak_active);
        info!(
            "Walk stats:\n\
             Directories scanned: {}\n\
             Entries examined: {}\n\
             Errors (read/stat): {}/{}\n\
             Listings cut short: {}\n\
             Peak active tasks: {}\n\
             Elapsed: {}",
            stats.dirs_scanned,
            stats.entries_seen,
            stats.read_errors,
            stats.stat_errors,
            stats.dirs_cut_short,
            stats.peak_active,
            humantime::format_duration(elapsed)
        );
    }
}
