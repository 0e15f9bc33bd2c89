//! The archive expansion seam.
//!
//! The importer treats archive expansion as one opaque unit of work: it asks
//! an [`ArchiveExpander`] for the slots of an archive and folds the answer into
//! a single [`SourceOutcome`]. How individual members fail is the expander's
//! business.

use tracing::debug;
use wgi_archive::{ArchiveError, ZipExpander};
use wgi_core::{AlertText, ImportError, ImportErrorKind, SourceId, SourceOutcome, TunnelConfig};

/// Turns one archive source into tunnel configuration slots.
///
/// Implementations are called from a blocking worker thread, so they may do
/// blocking I/O. They must be [`Send`] and [`Sync`] because one expander is
/// shared by every archive in an import.
pub trait ArchiveExpander: Send + Sync + 'static {
    /// The error reported when the archive cannot be expanded at all.
    type Error: std::error::Error + Send + 'static;

    /// Expands the archive. `None` slots are members that produced nothing.
    fn expand(&self, source: &SourceId) -> Result<Vec<Option<TunnelConfig>>, Self::Error>;

    /// The text to show the user for an expansion error.
    fn alert_text(&self, error: &Self::Error) -> AlertText;
}

impl ArchiveExpander for ZipExpander {
    type Error = ArchiveError;

    fn expand(&self, source: &SourceId) -> Result<Vec<Option<TunnelConfig>>, ArchiveError> {
        ZipExpander::expand(self, source)
    }

    fn alert_text(&self, error: &ArchiveError) -> AlertText {
        error.alert_text()
    }
}

/// Runs an expander and folds its answer into one outcome.
///
/// An empty success still yields one `None` placeholder slot so that the
/// archive counts as an attempted import.
pub fn expand_archive<E: ArchiveExpander + ?Sized>(expander: &E, source: &SourceId) -> SourceOutcome {
    match expander.expand(source) {
        Ok(slots) if slots.is_empty() => {
            debug!(source = %source, "Archive expanded to nothing");
            SourceOutcome::Success(vec![None])
        }
        Ok(slots) => SourceOutcome::Success(slots),
        Err(e) => {
            debug!(source = %source, error = %e, "Archive expansion failed");
            SourceOutcome::Failure(ImportError {
                kind: ImportErrorKind::ArchiveExpansionFailed,
                alert: expander.alert_text(&e),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(Result<usize, ()>);

    #[derive(Debug)]
    struct Boom;

    impl std::fmt::Display for Boom {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("boom")
        }
    }

    impl std::error::Error for Boom {}

    impl ArchiveExpander for Fixed {
        type Error = Boom;

        fn expand(&self, _source: &SourceId) -> Result<Vec<Option<TunnelConfig>>, Boom> {
            self.0.map(|n| vec![None; n]).map_err(|()| Boom)
        }

        fn alert_text(&self, _error: &Boom) -> AlertText {
            AlertText::new("Bad archive", "boom")
        }
    }

    #[test]
    fn test_failure_folds_into_archive_kind() {
        let outcome = expand_archive(&Fixed(Err(())), &SourceId::new("a.zip"));
        match outcome {
            SourceOutcome::Failure(e) => {
                assert_eq!(e.kind, ImportErrorKind::ArchiveExpansionFailed);
                assert_eq!(e.alert.title, "Bad archive");
            }
            SourceOutcome::Success(_) => panic!("expected failure"),
        }
    }

    #[test]
    fn test_empty_success_gets_placeholder() {
        let outcome = expand_archive(&Fixed(Ok(0)), &SourceId::new("a.zip"));
        assert_eq!(outcome, SourceOutcome::Success(vec![None]));
    }

    #[test]
    fn test_slots_pass_through() {
        let outcome = expand_archive(&Fixed(Ok(3)), &SourceId::new("a.zip"));
        assert_eq!(outcome, SourceOutcome::Success(vec![None, None, None]));
    }
}
