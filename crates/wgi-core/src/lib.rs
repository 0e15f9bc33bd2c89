//! Core types, errors, and configuration for the wg-import tool.
//!
//! This crate provides the foundational types used across the workspace:
//!
//! - Source identifiers and their classification ([`SourceId`], [`classify`])
//! - Parsed tunnel configurations ([`TunnelConfig`] and its parts)
//! - Per-source and per-import outcomes ([`SourceOutcome`], [`CommitReport`],
//!   [`ImportOutcome`])
//! - Error kinds and user-facing alert text ([`ImportErrorKind`], [`AlertText`])
//! - Configuration structures ([`Config`])

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod types;

pub use config::{Config, ImportConfig, MAX_CONCURRENT_SOURCES, StoreConfig};
pub use error::{AddressError, ConfigError, KeyError};
pub use types::{
    AlertText, CommitReport, Endpoint, ImportError, ImportErrorKind, ImportOutcome, ImportShape,
    InterfaceConfig, IpCidr, PeerConfig, SourceId, SourceKind, SourceOutcome, TunnelConfig, WgKey,
    classify, classify_with,
};
