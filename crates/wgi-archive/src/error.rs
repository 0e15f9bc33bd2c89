//! Error types for the wgi-archive crate.

use camino::Utf8PathBuf;
use wgi_core::AlertText;

/// Errors that stop an archive from being expanded at all.
///
/// Problems with individual members never surface here; a member that cannot
/// be decoded or parsed simply contributes an empty slot.
///
/// # Examples
///
/// ```
/// use wgi_archive::ArchiveError;
/// use camino::Utf8PathBuf;
///
/// let err = ArchiveError::NoTunnels(Utf8PathBuf::from("empty.zip"));
/// assert_eq!(err.alert_text().title, "No tunnels in zip archive");
/// ```
#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    /// The archive file could not be opened.
    #[error("failed to open archive {path}: {source}")]
    Unreadable {
        /// The archive path.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not a readable zip archive.
    #[error("bad or corrupt archive {path}: {source}")]
    BadArchive {
        /// The archive path.
        path: Utf8PathBuf,
        /// The underlying zip error.
        #[source]
        source: zip::result::ZipError,
    },

    /// The archive contains no tunnel files.
    #[error("no tunnel files in archive {0}")]
    NoTunnels(Utf8PathBuf),
}

impl ArchiveError {
    /// Creates a new [`ArchiveError::Unreadable`] error.
    #[inline]
    pub fn unreadable(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        Self::Unreadable {
            path: path.into(),
            source,
        }
    }

    /// Creates a new [`ArchiveError::BadArchive`] error.
    #[inline]
    pub fn bad_archive(path: impl Into<Utf8PathBuf>, source: zip::result::ZipError) -> Self {
        Self::BadArchive {
            path: path.into(),
            source,
        }
    }

    /// Returns the text to show the user for this error.
    #[must_use]
    pub fn alert_text(&self) -> AlertText {
        match self {
            Self::Unreadable { .. } => AlertText::new(
                "Unable to read zip archive",
                "The zip archive could not be read.",
            ),
            Self::BadArchive { .. } => {
                AlertText::new("Unable to read zip archive", "Bad or corrupt zip archive.")
            }
            Self::NoTunnels(_) => AlertText::new(
                "No tunnels in zip archive",
                "No .conf tunnel files were found inside the zip archive.",
            ),
        }
    }
}
