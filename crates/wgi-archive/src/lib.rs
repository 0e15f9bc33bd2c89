//! Zip archive expansion into WireGuard tunnel configurations.
//!
//! [`ZipExpander`] opens one zip archive, picks the members that look like
//! tunnel files, and parses each one with [`wgi_quick::parse`]. The result is
//! one slot per member: `Some` for a parsed tunnel, `None` for a member that
//! could not be decoded or parsed, or that duplicates the member before it.
//!
//! # Architecture
//!
//! ```text
//! ZipExpander::expand
//!     │
//!     ├── read members (sequential, zip::ZipArchive is not Sync)
//!     │       └── keep *.conf, drop directories and blank names
//!     │
//!     ├── sort by name
//!     │
//!     └── parse members (rayon par_iter, order preserved)
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

mod error;

pub use error::ArchiveError;

use std::fs::File;
use std::io::{BufReader, Read};

use camino::Utf8Path;
use rayon::prelude::*;
use tracing::{debug, info};
use wgi_core::{SourceId, TunnelConfig};

/// A tunnel file read out of an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Member {
    name: String,
    contents: Vec<u8>,
}

/// Expands zip archives of wg-quick `.conf` files.
///
/// # Examples
///
/// ```no_run
/// use wgi_archive::ZipExpander;
/// use wgi_core::SourceId;
///
/// let expander = ZipExpander::default();
/// let slots = expander.expand(&SourceId::new("tunnels.zip"))?;
/// println!("{} members, {} parsed", slots.len(), slots.iter().flatten().count());
/// # Ok::<(), wgi_archive::ArchiveError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ZipExpander {
    config_extension: String,
}

impl Default for ZipExpander {
    fn default() -> Self {
        Self::new("conf")
    }
}

impl ZipExpander {
    /// Creates an expander that picks members with the given extension.
    pub fn new(config_extension: impl Into<String>) -> Self {
        Self {
            config_extension: config_extension.into(),
        }
    }

    /// Expands an archive into one slot per tunnel member.
    ///
    /// # Errors
    ///
    /// - [`ArchiveError::Unreadable`] if the file cannot be opened
    /// - [`ArchiveError::BadArchive`] if it is not a valid zip archive
    /// - [`ArchiveError::NoTunnels`] if no member has the tunnel extension
    pub fn expand(&self, source: &SourceId) -> Result<Vec<Option<TunnelConfig>>, ArchiveError> {
        let path = source.path();
        let mut members = self.read_members(path)?;
        if members.is_empty() {
            return Err(ArchiveError::NoTunnels(path.to_owned()));
        }

        members.sort_by(|a, b| {
            a.name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then_with(|| a.name.cmp(&b.name))
        });

        let slots: Vec<Option<TunnelConfig>> = members
            .par_iter()
            .enumerate()
            .map(|(index, member)| {
                if index > 0 && members[index - 1] == *member {
                    debug!(name = %member.name, "Skipping duplicate archive member");
                    return None;
                }
                parse_member(member)
            })
            .collect();

        info!(
            archive = %path,
            members = slots.len(),
            parsed = slots.iter().flatten().count(),
            "Expanded archive"
        );

        Ok(slots)
    }

    fn read_members(&self, path: &Utf8Path) -> Result<Vec<Member>, ArchiveError> {
        let file = File::open(path.as_std_path()).map_err(|e| ArchiveError::unreadable(path, e))?;
        let mut archive = zip::ZipArchive::new(BufReader::new(file))
            .map_err(|e| ArchiveError::bad_archive(path, e))?;

        let mut members = Vec::new();
        for index in 0..archive.len() {
            let mut entry = archive
                .by_index(index)
                .map_err(|e| ArchiveError::bad_archive(path, e))?;
            if entry.is_dir() {
                continue;
            }

            let entry_path = Utf8Path::new(entry.name());
            let has_extension = entry_path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case(&self.config_extension));
            if !has_extension {
                continue;
            }
            let name = entry_path.file_stem().unwrap_or_default().trim().to_owned();
            if name.is_empty() {
                continue;
            }

            let mut contents = Vec::new();
            entry
                .read_to_end(&mut contents)
                .map_err(|e| ArchiveError::bad_archive(path, e.into()))?;
            members.push(Member { name, contents });
        }

        Ok(members)
    }
}

fn parse_member(member: &Member) -> Option<TunnelConfig> {
    let Ok(text) = std::str::from_utf8(&member.contents) else {
        debug!(name = %member.name, "Archive member is not UTF-8");
        return None;
    };
    match wgi_quick::parse(text, &member.name) {
        Ok(config) => Some(config),
        Err(e) => {
            debug!(name = %member.name, error = %e, "Archive member is not a valid tunnel");
            None
        }
    }
}
