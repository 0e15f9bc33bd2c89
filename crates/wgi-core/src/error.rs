//! Error types for the wgi-core crate.
//!
//! This module provides [`ConfigError`] for configuration loading failures and
//! the small value-parsing errors ([`KeyError`], [`AddressError`]) shared by the
//! tunnel configuration types.

use camino::Utf8PathBuf;

/// Errors that can occur during configuration loading and validation.
///
/// # Examples
///
/// ```
/// use wgi_core::ConfigError;
///
/// let error = ConfigError::InvalidOption {
///     option: "max_concurrent_sources".to_owned(),
///     reason: "must be positive".to_owned(),
/// };
/// assert!(error.to_string().contains("max_concurrent_sources"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file does not exist.
    #[error("configuration file not found: {0}")]
    NotFound(Utf8PathBuf),

    /// A configuration option has an invalid value.
    #[error("invalid configuration option '{option}': {reason}")]
    InvalidOption {
        /// The name of the invalid option.
        option: String,
        /// Explanation of why the option is invalid.
        reason: String,
    },

    /// An I/O error occurred while reading configuration.
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse the configuration file.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A WireGuard key that is not the base64 encoding of 32 bytes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid key: expected base64 of 32 bytes")]
pub struct KeyError;

/// Errors produced when parsing addresses and endpoints.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddressError {
    /// The IP address part could not be parsed.
    #[error("invalid IP address '{0}'")]
    InvalidIp(String),

    /// The prefix length is not a number or too large for the address family.
    #[error("invalid prefix length in '{0}'")]
    InvalidPrefix(String),

    /// The endpoint is not `host:port` or `[v6]:port`.
    #[error("invalid endpoint '{0}'")]
    InvalidEndpoint(String),
}
