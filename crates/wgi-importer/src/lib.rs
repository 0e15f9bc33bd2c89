//! Concurrent import of WireGuard tunnel files and archives.
//!
//! [`TunnelImporter`] takes a batch of user-supplied sources, processes each one
//! independently, commits whatever parsed into a [`TunnelStore`], and reduces
//! the many per-source results into at most one alert.
//!
//! # Example
//!
//! ```no_run
//! use wgi_core::{AlertText, ImportConfig, SourceId};
//! use wgi_importer::{AlertPresenter, TunnelCollection, TunnelImporter};
//!
//! struct Stderr;
//!
//! impl AlertPresenter for Stderr {
//!     fn show_alert(&self, alert: &AlertText) {
//!         eprintln!("{alert}");
//!     }
//! }
//!
//! # async fn run() -> Result<(), wgi_core::ConfigError> {
//! let importer = TunnelImporter::new(ImportConfig::default())?;
//! let store = TunnelCollection::new();
//! let sources = [SourceId::new("office.conf"), SourceId::new("bundle.zip")];
//!
//! let report = importer.import(&sources, &store, &Stderr).await;
//! println!("{} of {} imported", report.number_successful, report.parsed_count);
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! ```text
//! TunnelImporter::import
//!     │
//!     ├── classify each source (archive extension)
//!     │
//!     ├── FanOutJoin (one task per source, blocking work off the caller)
//!     │       ├── ArchiveExpander::expand   (archives)
//!     │       └── load_plain                (plain files)
//!     │
//!     ├── aggregate   (drop empty slots, keep the total)
//!     ├── TunnelStore::add_multiple
//!     └── presenter::decide ──► AlertPresenter::show_alert (at most once)
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

mod aggregate;
mod expander;
mod join;
mod loader;
pub mod messages;
pub mod presenter;
mod stats;
mod store;

pub use expander::{ArchiveExpander, expand_archive};
pub use loader::load_plain;
pub use presenter::AlertPresenter;
pub use stats::{ImportStats, StatsSnapshot};
pub use store::{TunnelCollection, TunnelStore};

use std::sync::Arc;

use serde::Serialize;
use tracing::info;
use wgi_archive::ZipExpander;
use wgi_core::{ConfigError, ImportConfig, ImportOutcome, ImportShape, SourceId};

use crate::aggregate::aggregate;
use crate::join::FanOutJoin;

/// Summary of one finished import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    /// The shape of the request.
    pub shape: ImportShape,
    /// Every attempted configuration, parsed or not.
    pub parsed_count: usize,
    /// Configurations the store accepted.
    pub number_successful: usize,
    /// What was shown to the user, if anything.
    pub outcome: ImportOutcome,
    /// Counters gathered while processing sources.
    pub stats: StatsSnapshot,
}

/// Imports batches of tunnel sources.
///
/// One importer can run any number of imports; each call to
/// [`import`](Self::import) is independent.
#[derive(Debug)]
pub struct TunnelImporter<E = ZipExpander> {
    join: FanOutJoin<E>,
    archive_extension: String,
}

impl TunnelImporter<ZipExpander> {
    /// Creates an importer that expands zip archives.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidOption`] if the configuration is invalid.
    pub fn new(config: ImportConfig) -> Result<Self, ConfigError> {
        let expander = ZipExpander::new(config.config_extension.clone());
        Self::with_expander(config, expander)
    }
}

impl<E: ArchiveExpander> TunnelImporter<E> {
    /// Creates an importer with a custom archive expander.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidOption`] if the configuration is invalid.
    pub fn with_expander(config: ImportConfig, expander: E) -> Result<Self, ConfigError> {
        config.validate()?;
        let archive_extension = config.archive_extension.clone();
        Ok(Self {
            join: FanOutJoin::new(Arc::new(expander), config),
            archive_extension,
        })
    }

    /// Imports every source and reports the result.
    ///
    /// All sources are processed before anything is committed. The commit,
    /// the decision about what to show, and the call to `presenter` all
    /// happen on the calling task, after the join. The presenter is called
    /// at most once. An empty request returns immediately without touching
    /// the store.
    pub async fn import<S, P>(&self, sources: &[SourceId], store: &S, presenter: &P) -> ImportReport
    where
        S: TunnelStore + ?Sized,
        P: AlertPresenter + ?Sized,
    {
        let shape = ImportShape::of(sources, &self.archive_extension);
        let stats = Arc::new(ImportStats::new());

        if sources.is_empty() {
            return ImportReport {
                shape,
                parsed_count: 0,
                number_successful: 0,
                outcome: ImportOutcome::Silent,
                stats: stats.snapshot(),
            };
        }

        info!(count = sources.len(), ?shape, "Starting import");
        let joined = self.join.run(sources, &stats).await;
        let aggregated = aggregate(joined);
        let commit = store.add_multiple(aggregated.configs);

        let outcome = presenter::decide(
            shape,
            aggregated.parsed_count,
            &commit,
            aggregated.last_error.as_ref(),
        );
        if let Some(alert) = outcome.alert() {
            presenter.show_alert(alert);
        }

        info!(
            parsed = aggregated.parsed_count,
            added = commit.number_successful,
            silent = outcome.alert().is_none(),
            "Import finished"
        );

        ImportReport {
            shape,
            parsed_count: aggregated.parsed_count,
            number_successful: commit.number_successful,
            outcome,
            stats: stats.snapshot(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_invalid_config() {
        let config = ImportConfig {
            max_concurrent_sources: Some(0),
            ..ImportConfig::default()
        };
        assert!(matches!(
            TunnelImporter::new(config),
            Err(ConfigError::InvalidOption { .. })
        ));
    }

    #[test]
    fn test_rejects_concurrency_beyond_semaphore_limit() {
        let config = ImportConfig {
            max_concurrent_sources: Some(usize::MAX),
            ..ImportConfig::default()
        };
        assert!(matches!(
            TunnelImporter::new(config),
            Err(ConfigError::InvalidOption { .. })
        ));
    }

    #[tokio::test]
    async fn test_report_serializes() {
        let importer = TunnelImporter::new(ImportConfig::default()).unwrap();
        let store = TunnelCollection::new();
        struct Mute;
        impl AlertPresenter for Mute {
            fn show_alert(&self, _alert: &wgi_core::AlertText) {}
        }

        let report = importer.import(&[], &store, &Mute).await;
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["shape"], "empty");
        assert_eq!(json["outcome"]["type"], "silent");
        assert_eq!(json["stats"]["sources"], 0);
    }
}
