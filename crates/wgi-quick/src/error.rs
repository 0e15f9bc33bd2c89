//! Error types for the wgi-quick crate.
//!
//! This module provides the [`ParseError`] type for errors that can occur
//! while parsing wg-quick configuration text.

use wgi_core::AddressError;

/// The section a key belongs to, used in error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    /// The `[Interface]` section.
    Interface,
    /// A `[Peer]` section.
    Peer,
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Interface => f.write_str("Interface"),
            Self::Peer => f.write_str("Peer"),
        }
    }
}

/// Errors that can occur while parsing a wg-quick configuration.
///
/// # Examples
///
/// ```
/// use wgi_quick::{parse, ParseError};
///
/// let err = parse("", "empty").unwrap_err();
/// assert_eq!(err, ParseError::NoInterface);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// A line is neither a section header, a known key, nor a comment.
    #[error("invalid line {line}: '{text}'")]
    InvalidLine {
        /// 1-indexed line number.
        line: usize,
        /// The offending line, trimmed.
        text: String,
    },

    /// There is no `[Interface]` section.
    #[error("configuration has no [Interface] section")]
    NoInterface,

    /// There is more than one `[Interface]` section.
    #[error("configuration has more than one [Interface] section")]
    MultipleInterfaces,

    /// A non-list key appears twice in one section.
    #[error("key '{key}' appears more than once in [{section}]")]
    DuplicateKey {
        /// The section containing the key.
        section: Section,
        /// The repeated key as written.
        key: String,
    },

    /// A required key is missing.
    #[error("[{section}] has no {key}")]
    MissingKey {
        /// The section missing the key.
        section: Section,
        /// The missing key.
        key: &'static str,
    },

    /// A key value is not base64 of 32 bytes.
    #[error("[{section}] has an invalid {key}")]
    InvalidKey {
        /// The section containing the key.
        section: Section,
        /// Which key field was invalid.
        key: &'static str,
    },

    /// An address, allowed IP, DNS entry or endpoint is malformed.
    #[error("[{section}] has an invalid {key}: {source}")]
    InvalidAddress {
        /// The section containing the value.
        section: Section,
        /// Which field was invalid.
        key: &'static str,
        /// The underlying address error.
        #[source]
        source: AddressError,
    },

    /// A numeric value does not fit in 16 bits.
    #[error("[{section}] has an invalid {key} '{value}'")]
    InvalidNumber {
        /// The section containing the value.
        section: Section,
        /// Which field was invalid.
        key: &'static str,
        /// The value as written.
        value: String,
    },

    /// Two peers share a public key.
    #[error("two peers have the same public key")]
    DuplicatePeerKey,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_line_display() {
        let err = ParseError::InvalidLine {
            line: 3,
            text: "garbage".to_owned(),
        };
        assert_eq!(err.to_string(), "invalid line 3: 'garbage'");
    }

    #[test]
    fn test_missing_key_display() {
        let err = ParseError::MissingKey {
            section: Section::Peer,
            key: "PublicKey",
        };
        assert_eq!(err.to_string(), "[Peer] has no PublicKey");
    }

    #[test]
    fn test_invalid_address_source() {
        use std::error::Error as _;

        let err = ParseError::InvalidAddress {
            section: Section::Interface,
            key: "Address",
            source: AddressError::InvalidIp("x".to_owned()),
        };
        assert!(err.source().is_some());
    }
}
