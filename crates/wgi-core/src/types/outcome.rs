//! Outcome types for an import run.
//!
//! Each source produces exactly one [`SourceOutcome`]. The bulk commit step
//! produces one [`CommitReport`], and the run as a whole reduces to one
//! [`ImportOutcome`]: either nothing to show, or a single alert.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::source::{SourceId, SourceKind, classify_with};
use super::tunnel::TunnelConfig;

/// The kinds of failure an import can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum ImportErrorKind {
    /// A plain source could not be opened or read.
    SourceUnreadable,
    /// A plain source was read but is not a valid tunnel configuration.
    ConfigMalformed,
    /// The archive expander reported an error for an archive source.
    ArchiveExpansionFailed,
    /// The tunnel store declined one or more parsed configurations.
    CommitRejected,
    /// A source did not finish within the configured deadline.
    SourceTimedOut,
}

impl ImportErrorKind {
    /// Returns a short label for logs and reports.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::SourceUnreadable => "source unreadable",
            Self::ConfigMalformed => "config malformed",
            Self::ArchiveExpansionFailed => "archive expansion failed",
            Self::CommitRejected => "commit rejected",
            Self::SourceTimedOut => "source timed out",
        }
    }
}

impl fmt::Display for ImportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A title and message pair ready to be shown to a person.
///
/// # Examples
///
/// ```
/// use wgi_core::AlertText;
///
/// let alert = AlertText::new("Unable to import tunnel", "Bad file");
/// assert_eq!(alert.to_string(), "Unable to import tunnel: Bad file");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AlertText {
    /// Short heading.
    pub title: String,
    /// Longer explanation.
    pub message: String,
}

impl AlertText {
    /// Creates a new alert text.
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for AlertText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.title, self.message)
    }
}

/// A failure observed while importing: its kind plus the text to show for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{kind}: {alert}")]
pub struct ImportError {
    /// What went wrong.
    pub kind: ImportErrorKind,
    /// What to tell the user.
    pub alert: AlertText,
}

impl ImportError {
    /// Creates a new import error.
    pub fn new(kind: ImportErrorKind, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            alert: AlertText::new(title, message),
        }
    }
}

/// The result of processing one source.
///
/// A successful source contributes one slot per configuration it tried to
/// produce. `None` slots stand for archive members that yielded nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceOutcome {
    /// The source was read; each slot is one attempted configuration.
    Success(Vec<Option<TunnelConfig>>),
    /// The source failed as a whole.
    Failure(ImportError),
}

impl SourceOutcome {
    /// A success carrying exactly one configuration.
    #[must_use]
    pub fn single(config: TunnelConfig) -> Self {
        Self::Success(vec![Some(config)])
    }

    /// Creates a failure outcome.
    pub fn failure(kind: ImportErrorKind, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Failure(ImportError::new(kind, title, message))
    }

    /// Returns `true` for a failure.
    #[inline]
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Failure(_))
    }
}

/// What the tunnel store reports after a bulk add.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitReport {
    /// How many configurations were added.
    pub number_successful: usize,
    /// The last rejection, when fewer than all were added.
    pub last_rejection: Option<ImportError>,
}

impl CommitReport {
    /// A report for a commit where every configuration was accepted.
    #[must_use]
    pub const fn all_added(count: usize) -> Self {
        Self {
            number_successful: count,
            last_rejection: None,
        }
    }
}

/// The final reduction of an import run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ImportOutcome {
    /// Everything worked, or there is nothing worth saying.
    Silent,
    /// One alert to show.
    Alert(AlertText),
}

impl ImportOutcome {
    /// Returns the alert, if there is one.
    #[must_use]
    pub const fn alert(&self) -> Option<&AlertText> {
        match self {
            Self::Silent => None,
            Self::Alert(alert) => Some(alert),
        }
    }
}

/// The shape of an import request, as far as presentation is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportShape {
    /// No sources at all.
    Empty,
    /// Exactly one plain source.
    SinglePlain,
    /// Exactly one archive source.
    SingleArchive,
    /// More than one source of any kind.
    Multiple,
}

impl ImportShape {
    /// Derives the shape of a request.
    ///
    /// # Examples
    ///
    /// ```
    /// use wgi_core::{ImportShape, SourceId};
    ///
    /// let single = [SourceId::new("tunnels.zip")];
    /// assert_eq!(ImportShape::of(&single, "zip"), ImportShape::SingleArchive);
    /// assert_eq!(ImportShape::of(&[], "zip"), ImportShape::Empty);
    /// ```
    #[must_use]
    pub fn of(sources: &[SourceId], archive_extension: &str) -> Self {
        match sources {
            [] => Self::Empty,
            [only] => match classify_with(only, archive_extension) {
                SourceKind::Archive => Self::SingleArchive,
                SourceKind::Plain => Self::SinglePlain,
            },
            _ => Self::Multiple,
        }
    }
}
