//! Domain types for the wg-import tool.
//!
//! # Module Organization
//!
//! - [`source`] - Source identifiers and archive/plain classification
//! - [`tunnel`] - Parsed WireGuard tunnel configurations
//! - [`outcome`] - Per-source outcomes, commit reports and final import outcomes
//!
//! All public types are re-exported here and at the crate root:
//!
//! ```
//! use wgi_core::{SourceId, SourceKind, TunnelConfig, SourceOutcome};
//! ```

mod outcome;
mod source;
mod tunnel;

pub use outcome::{
    AlertText, CommitReport, ImportError, ImportErrorKind, ImportOutcome, ImportShape,
    SourceOutcome,
};
pub use source::{SourceId, SourceKind, classify, classify_with};
pub use tunnel::{Endpoint, InterfaceConfig, IpCidr, PeerConfig, TunnelConfig, WgKey};
