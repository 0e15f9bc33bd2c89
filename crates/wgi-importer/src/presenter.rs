//! Reduction of an import run to at most one alert.

use wgi_core::{AlertText, CommitReport, ImportError, ImportOutcome, ImportShape};

use crate::messages;

/// Where alerts are shown.
pub trait AlertPresenter {
    /// Shows one alert to the user.
    fn show_alert(&self, alert: &AlertText);
}

/// Decides what, if anything, to tell the user about an import.
///
/// 1. Every attempted configuration was committed: silent.
/// 2. A single archive that yielded anything: an "N of M from zip archive"
///    summary.
/// 3. A single source otherwise: the last source error, else the store's last
///    rejection, else silent.
/// 4. Several sources: an "N of M from files" summary.
///
/// # Examples
///
/// ```
/// use wgi_core::{CommitReport, ImportOutcome, ImportShape};
/// use wgi_importer::presenter::decide;
///
/// let outcome = decide(ImportShape::Multiple, 3, &CommitReport::all_added(2), None);
/// let alert = outcome.alert().unwrap();
/// assert_eq!(alert.message, "Imported 2 of 3 tunnels from files");
///
/// let outcome = decide(ImportShape::SinglePlain, 1, &CommitReport::all_added(1), None);
/// assert_eq!(outcome, ImportOutcome::Silent);
/// ```
#[must_use]
pub fn decide(
    shape: ImportShape,
    parsed_count: usize,
    commit: &CommitReport,
    last_error: Option<&ImportError>,
) -> ImportOutcome {
    let successful = commit.number_successful;
    if parsed_count > 0 && successful == parsed_count {
        return ImportOutcome::Silent;
    }

    match shape {
        ImportShape::Empty => ImportOutcome::Silent,
        ImportShape::SingleArchive if parsed_count > 0 => {
            ImportOutcome::Alert(messages::imported_from_zip(successful, parsed_count))
        }
        ImportShape::SingleArchive | ImportShape::SinglePlain => last_error
            .or(commit.last_rejection.as_ref())
            .map_or(ImportOutcome::Silent, |e| ImportOutcome::Alert(e.alert.clone())),
        ImportShape::Multiple => {
            ImportOutcome::Alert(messages::imported_from_multiple_files(successful, parsed_count))
        }
    }
}
