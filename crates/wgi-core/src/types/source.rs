//! Source identifiers and classification.

use std::fmt;

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

/// Default extension that marks a source as an archive.
const ARCHIVE_EXTENSION: &str = "zip";

/// The location of one user-supplied input.
///
/// # Examples
///
/// ```
/// use wgi_core::SourceId;
///
/// let source = SourceId::new("/home/me/Downloads/ office .conf");
/// assert_eq!(source.file_name(), " office .conf");
/// assert_eq!(source.base_name(), "office");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceId(Utf8PathBuf);

impl SourceId {
    /// Creates a source identifier from a path.
    #[inline]
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self(path.into())
    }

    /// Returns the underlying path.
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.0
    }

    /// Returns the last path component, used when naming the source in messages.
    ///
    /// Falls back to the whole identifier when there is no final component.
    #[must_use]
    pub fn file_name(&self) -> &str {
        self.0.file_name().unwrap_or(self.0.as_str())
    }

    /// Returns the file name without its extension, whitespace-trimmed.
    ///
    /// This is the default name a tunnel is imported under.
    #[must_use]
    pub fn base_name(&self) -> &str {
        self.0.file_stem().unwrap_or_default().trim()
    }

    /// Returns the extension, if any.
    #[must_use]
    pub fn extension(&self) -> Option<&str> {
        self.0.extension()
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<Utf8PathBuf> for SourceId {
    fn from(path: Utf8PathBuf) -> Self {
        Self(path)
    }
}

impl From<&str> for SourceId {
    fn from(path: &str) -> Self {
        Self(Utf8PathBuf::from(path))
    }
}

/// Whether a source is an archive of tunnel files or a single tunnel file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// A compressed container holding zero or more tunnel files.
    Archive,
    /// A single tunnel configuration file.
    Plain,
}

/// Classifies a source using the default `zip` archive extension.
///
/// # Examples
///
/// ```
/// use wgi_core::{classify, SourceId, SourceKind};
///
/// assert_eq!(classify(&SourceId::new("tunnels.ZIP")), SourceKind::Archive);
/// assert_eq!(classify(&SourceId::new("office.conf")), SourceKind::Plain);
/// assert_eq!(classify(&SourceId::new("zip")), SourceKind::Plain);
/// ```
#[inline]
#[must_use]
pub fn classify(source: &SourceId) -> SourceKind {
    classify_with(source, ARCHIVE_EXTENSION)
}

/// Classifies a source against an explicit archive extension (case-insensitive).
#[must_use]
pub fn classify_with(source: &SourceId, archive_extension: &str) -> SourceKind {
    match source.extension() {
        Some(ext) if ext.eq_ignore_ascii_case(archive_extension) => SourceKind::Archive,
        _ => SourceKind::Plain,
    }
}
