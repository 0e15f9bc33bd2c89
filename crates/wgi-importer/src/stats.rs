//! Import statistics with atomic counters.
//!
//! Every unit of work updates one shared [`ImportStats`] as it finishes. The
//! counters are informational only, so they use relaxed ordering.
//!
//! # Examples
//!
//! ```
//! use wgi_importer::ImportStats;
//!
//! let stats = ImportStats::new();
//! stats.record_source(false);
//! stats.add_configs(1);
//!
//! let snapshot = stats.snapshot();
//! assert_eq!(snapshot.sources, 1);
//! assert_eq!(snapshot.configs_parsed, 1);
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Atomic counters describing one import run.
#[derive(Debug, Default)]
pub struct ImportStats {
    sources: AtomicU64,
    archives: AtomicU64,
    configs_parsed: AtomicU64,
    source_failures: AtomicU64,
}

impl ImportStats {
    /// Creates a new [`ImportStats`] with all counters at zero.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one finished source.
    #[inline]
    pub fn record_source(&self, is_archive: bool) {
        self.sources.fetch_add(1, Ordering::Relaxed);
        if is_archive {
            self.archives.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Adds to the number of configurations that parsed.
    #[inline]
    pub fn add_configs(&self, count: u64) {
        self.configs_parsed.fetch_add(count, Ordering::Relaxed);
    }

    /// Counts one source that failed as a whole.
    #[inline]
    pub fn increment_failures(&self) {
        self.source_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns a point-in-time snapshot of all counters.
    #[must_use]
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            sources: self.sources.load(Ordering::Relaxed),
            archives: self.archives.load(Ordering::Relaxed),
            configs_parsed: self.configs_parsed.load(Ordering::Relaxed),
            source_failures: self.source_failures.load(Ordering::Relaxed),
        }
    }
}

/// A copy of [`ImportStats`] that can be stored and serialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatsSnapshot {
    /// Sources that finished, archives included.
    pub sources: u64,
    /// Sources that were archives.
    pub archives: u64,
    /// Configurations that parsed successfully.
    pub configs_parsed: u64,
    /// Sources that failed as a whole.
    pub source_failures: u64,
}

impl StatsSnapshot {
    /// Sources that were plain tunnel files.
    #[inline]
    #[must_use]
    pub const fn plain(&self) -> u64 {
        self.sources.saturating_sub(self.archives)
    }
}
