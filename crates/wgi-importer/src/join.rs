//! Fan-out of per-source work and the join that collects it.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────── coordinating task ────────────────────────┐
//! │                                                                   │
//! │  for each source ──► tokio::spawn ──► spawn_blocking(load/expand) │
//! │                           │                                       │
//! │                           └──► mpsc::Sender<UnitReport>           │
//! │                                                                   │
//! │  mpsc::Receiver<UnitReport> ──► JoinState (owned here only)       │
//! │                                                                   │
//! └───────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Units never touch the join state. Each one sends exactly one report, and
//! the coordinating task folds reports in the order they arrive.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Semaphore, mpsc};
use tracing::{debug, warn};
use wgi_core::{
    ImportConfig, ImportError, ImportErrorKind, SourceId, SourceKind, SourceOutcome, TunnelConfig,
    classify_with,
};

use crate::expander::{ArchiveExpander, expand_archive};
use crate::loader::load_plain;
use crate::messages;
use crate::stats::ImportStats;

/// One finished unit of work.
#[derive(Debug)]
struct UnitReport {
    index: usize,
    source: SourceId,
    kind: SourceKind,
    outcome: SourceOutcome,
}

/// What the join hands to the aggregator.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct JoinResult {
    /// Configuration slots in arrival order. `None` marks an attempt that
    /// produced nothing but still counts toward the total.
    pub slots: Vec<Option<TunnelConfig>>,
    /// The error from the most recently finished failing source.
    pub last_error: Option<ImportError>,
}

/// Join state, owned by the coordinating task.
#[derive(Debug, Default)]
struct JoinState {
    slots: Vec<Option<TunnelConfig>>,
    last_error: Option<ImportError>,
    completed: usize,
}

impl JoinState {
    fn record(&mut self, kind: SourceKind, outcome: SourceOutcome) {
        self.completed += 1;
        match outcome {
            SourceOutcome::Success(slots) => self.slots.extend(slots),
            SourceOutcome::Failure(error) => {
                // A failed plain file still counts as one attempted tunnel; a
                // failed archive contributes nothing.
                if kind == SourceKind::Plain {
                    self.slots.push(None);
                }
                self.last_error = Some(error);
            }
        }
    }

    fn finish(self) -> JoinResult {
        JoinResult {
            slots: self.slots,
            last_error: self.last_error,
        }
    }
}

/// Runs one unit of work per source and joins them.
#[derive(Debug)]
pub struct FanOutJoin<E> {
    expander: Arc<E>,
    config: ImportConfig,
}

impl<E: ArchiveExpander> FanOutJoin<E> {
    pub fn new(expander: Arc<E>, config: ImportConfig) -> Self {
        Self { expander, config }
    }

    /// Dispatches every source and waits for all of them.
    ///
    /// Returns once every unit has reported, or once no unit can report any
    /// more. Each finished unit is counted in `stats`.
    pub async fn run(&self, sources: &[SourceId], stats: &Arc<ImportStats>) -> JoinResult {
        let total = sources.len();
        if total == 0 {
            return JoinResult::default();
        }

        let (tx, mut rx) = mpsc::channel::<UnitReport>(total);
        let limit = self
            .config
            .max_concurrent_sources
            .map(|n| Arc::new(Semaphore::new(n.min(Semaphore::MAX_PERMITS))));
        let deadline = self.config.unit_timeout_ms.map(Duration::from_millis);

        for (index, source) in sources.iter().enumerate() {
            let kind = classify_with(source, &self.config.archive_extension);
            let source = source.clone();
            let tx = tx.clone();
            let expander = Arc::clone(&self.expander);
            let stats = Arc::clone(stats);
            let limit = limit.as_ref().map(Arc::clone);

            tokio::spawn(async move {
                let _permit = match limit {
                    Some(semaphore) => semaphore.acquire_owned().await.ok(),
                    None => None,
                };

                let file_name = source.file_name().to_owned();
                let work_source = source.clone();
                let outcome = run_unit(kind, &file_name, deadline, move || match kind {
                    SourceKind::Archive => expand_archive(expander.as_ref(), &work_source),
                    SourceKind::Plain => load_plain(&work_source),
                })
                .await;
                stats.record_source(kind == SourceKind::Archive);
                match &outcome {
                    SourceOutcome::Success(slots) => {
                        stats.add_configs(slots.iter().flatten().count() as u64);
                    }
                    SourceOutcome::Failure(_) => stats.increment_failures(),
                }

                let report = UnitReport {
                    index,
                    source,
                    kind,
                    outcome,
                };
                if tx.send(report).await.is_err() {
                    debug!(index, "Join stopped listening before unit finished");
                }
            });
        }
        drop(tx);

        let mut state = JoinState::default();
        while state.completed < total {
            let Some(report) = rx.recv().await else {
                warn!(
                    completed = state.completed,
                    total, "Units stopped reporting before the join completed"
                );
                break;
            };
            debug!(
                index = report.index,
                source = %report.source,
                failed = report.outcome.is_failure(),
                "Unit finished"
            );
            state.record(report.kind, report.outcome);
        }

        state.finish()
    }
}

/// Runs the blocking work for one source, honoring the optional deadline.
///
/// A unit that misses its deadline or panics still yields a failure outcome
/// of the right kind for its source.
async fn run_unit<F>(
    kind: SourceKind,
    file_name: &str,
    deadline: Option<Duration>,
    work: F,
) -> SourceOutcome
where
    F: FnOnce() -> SourceOutcome + Send + 'static,
{
    let work = tokio::task::spawn_blocking(work);

    let joined = match deadline {
        Some(limit) => match tokio::time::timeout(limit, work).await {
            Ok(joined) => joined,
            Err(_) => {
                warn!(source = %file_name, timeout_ms = limit.as_millis(), "Source timed out");
                return SourceOutcome::Failure(ImportError {
                    kind: ImportErrorKind::SourceTimedOut,
                    alert: messages::source_timed_out(file_name),
                });
            }
        },
        None => work.await,
    };

    joined.unwrap_or_else(|e| {
        warn!(source = %file_name, error = %e, "Unit of work panicked");
        let error = match kind {
            SourceKind::Archive => ImportError {
                kind: ImportErrorKind::ArchiveExpansionFailed,
                alert: messages::cant_read_archive(),
            },
            SourceKind::Plain => ImportError {
                kind: ImportErrorKind::SourceUnreadable,
                alert: messages::cant_open_file(file_name),
            },
        };
        SourceOutcome::Failure(error)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wgi_core::{AlertText, WgKey};

    const KEY: &str = "yAnz5TF+lXXJte14tji3zlMNq+hd2rYUIgJBgB3fBmk=";

    fn tunnel(name: &str) -> TunnelConfig {
        let key = WgKey::from_base64(KEY).unwrap();
        TunnelConfig::new(name, wgi_core::InterfaceConfig::new(key), Vec::new())
    }

    #[derive(Debug)]
    struct Boom;

    impl std::fmt::Display for Boom {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("boom")
        }
    }

    impl std::error::Error for Boom {}

    /// Expander that answers from the archive's file name without touching disk.
    struct Scripted {
        delay: Duration,
    }

    impl ArchiveExpander for Scripted {
        type Error = Boom;

        fn expand(&self, source: &SourceId) -> Result<Vec<Option<TunnelConfig>>, Boom> {
            std::thread::sleep(self.delay);
            match source.base_name() {
                "bad" => Err(Boom),
                "panic" => panic!("expander blew up"),
                "two" => Ok(vec![Some(tunnel("a")), None]),
                _ => Ok(Vec::new()),
            }
        }

        fn alert_text(&self, _error: &Boom) -> AlertText {
            AlertText::new("Bad archive", "boom")
        }
    }

    async fn run(config: ImportConfig, delay: Duration, sources: &[SourceId]) -> JoinResult {
        FanOutJoin::new(Arc::new(Scripted { delay }), config)
            .run(sources, &Arc::new(ImportStats::new()))
            .await
    }

    #[test]
    fn test_record_plain_failure_adds_placeholder() {
        let mut state = JoinState::default();
        let error = ImportError::new(ImportErrorKind::SourceUnreadable, "T", "M");
        state.record(SourceKind::Plain, SourceOutcome::Failure(error.clone()));
        state.record(SourceKind::Archive, SourceOutcome::Failure(error));
        assert_eq!(state.completed, 2);
        assert_eq!(state.slots, vec![None]);
    }

    #[test]
    fn test_record_last_error_wins() {
        let mut state = JoinState::default();
        let first = ImportError::new(ImportErrorKind::SourceUnreadable, "first", "");
        let second = ImportError::new(ImportErrorKind::ConfigMalformed, "second", "");
        state.record(SourceKind::Plain, SourceOutcome::Failure(first));
        state.record(SourceKind::Plain, SourceOutcome::single(tunnel("x")));
        state.record(SourceKind::Plain, SourceOutcome::Failure(second.clone()));
        let result = state.finish();
        assert_eq!(result.slots.len(), 3);
        assert_eq!(result.last_error, Some(second));
    }

    #[test]
    fn test_record_keeps_slots_as_given() {
        let mut state = JoinState::default();
        state.record(SourceKind::Archive, SourceOutcome::Success(Vec::new()));
        state.record(SourceKind::Archive, SourceOutcome::Success(vec![None]));
        assert_eq!(state.completed, 2);
        assert_eq!(state.slots, vec![None]);
    }

    #[tokio::test]
    async fn test_plain_unit_timeout_keeps_its_slot() {
        let outcome = run_unit(
            SourceKind::Plain,
            "slow.conf",
            Some(Duration::from_millis(10)),
            || {
                std::thread::sleep(Duration::from_millis(300));
                SourceOutcome::single(tunnel("slow"))
            },
        )
        .await;
        let SourceOutcome::Failure(error) = &outcome else {
            panic!("expected timeout, got {outcome:?}");
        };
        assert_eq!(error.kind, ImportErrorKind::SourceTimedOut);
        assert_eq!(error.alert, messages::source_timed_out("slow.conf"));

        let mut state = JoinState::default();
        state.record(SourceKind::Plain, outcome);
        let result = state.finish();
        assert_eq!(result.slots, vec![None]);
        assert_eq!(
            result.last_error.map(|e| e.kind),
            Some(ImportErrorKind::SourceTimedOut)
        );
    }

    #[tokio::test]
    async fn test_panicking_plain_unit_is_unreadable() {
        let outcome = run_unit(SourceKind::Plain, "boom.conf", None, || panic!("loader blew up")).await;
        assert_eq!(
            outcome,
            SourceOutcome::Failure(ImportError {
                kind: ImportErrorKind::SourceUnreadable,
                alert: messages::cant_open_file("boom.conf"),
            })
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrency_limit_above_semaphore_maximum() {
        let config = ImportConfig {
            max_concurrent_sources: Some(usize::MAX),
            ..ImportConfig::default()
        };
        let result = run(config, Duration::ZERO, &[SourceId::new("two.zip")]).await;
        assert_eq!(result.slots.len(), 2);
    }

    #[tokio::test]
    async fn test_empty_request() {
        let result = run(ImportConfig::default(), Duration::ZERO, &[]).await;
        assert!(result.slots.is_empty());
        assert!(result.last_error.is_none());
    }

    #[tokio::test]
    async fn test_archive_outcomes() {
        let sources = [
            SourceId::new("two.zip"),
            SourceId::new("bad.zip"),
            SourceId::new("empty.zip"),
        ];
        let result = run(ImportConfig::default(), Duration::ZERO, &sources).await;
        // two slots + nothing for the failure + one placeholder for the empty archive
        assert_eq!(result.slots.len(), 3);
        assert_eq!(result.slots.iter().flatten().count(), 1);
        let error = result.last_error.unwrap();
        assert_eq!(error.kind, ImportErrorKind::ArchiveExpansionFailed);
    }

    #[tokio::test]
    async fn test_panicking_unit_still_reports() {
        let sources = [SourceId::new("panic.zip"), SourceId::new("two.zip")];
        let result = run(ImportConfig::default(), Duration::ZERO, &sources).await;
        // A failed archive adds no slot, even when it panicked.
        assert_eq!(result.slots.len(), 2);
        let error = result.last_error.unwrap();
        assert_eq!(error.kind, ImportErrorKind::ArchiveExpansionFailed);
        assert_eq!(error.alert, messages::cant_read_archive());
    }

    #[tokio::test]
    async fn test_missing_plain_source() {
        let sources = [SourceId::new("/nonexistent/dir/home.conf")];
        let result = run(ImportConfig::default(), Duration::ZERO, &sources).await;
        assert_eq!(result.slots, vec![None]);
        assert_eq!(
            result.last_error.map(|e| e.kind),
            Some(ImportErrorKind::SourceUnreadable)
        );
    }

    #[tokio::test]
    async fn test_deadline_abandons_slow_unit() {
        let config = ImportConfig {
            unit_timeout_ms: Some(10),
            ..ImportConfig::default()
        };
        let sources = [SourceId::new("two.zip")];
        let result = run(config, Duration::from_millis(500), &sources).await;
        assert!(result.slots.is_empty());
        assert_eq!(
            result.last_error.map(|e| e.kind),
            Some(ImportErrorKind::SourceTimedOut)
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_bounded_concurrency_completes() {
        let config = ImportConfig {
            max_concurrent_sources: Some(1),
            ..ImportConfig::default()
        };
        let sources: Vec<SourceId> = (0..5).map(|_| SourceId::new("two.zip")).collect();
        let stats = Arc::new(ImportStats::new());
        let join = FanOutJoin::new(
            Arc::new(Scripted {
                delay: Duration::from_millis(5),
            }),
            config,
        );
        let result = join.run(&sources, &stats).await;
        assert_eq!(result.slots.len(), 10);
        let snap = stats.snapshot();
        assert_eq!(snap.sources, 5);
        assert_eq!(snap.archives, 5);
        assert_eq!(snap.configs_parsed, 5);
    }
}
