//! wg-quick configuration parser.
//!
//! Turns the text of a WireGuard `.conf` file into a [`wgi_core::TunnelConfig`].
//! The accepted format is the one written by `wg-quick` and WireGuard clients:
//!
//! | Section | Keys |
//! |---------|------|
//! | `[Interface]` (exactly one) | `PrivateKey` (required), `Address`, `ListenPort`, `MTU`, `DNS` |
//! | `[Peer]` (any number) | `PublicKey` (required), `PresharedKey`, `AllowedIPs`, `Endpoint`, `PersistentKeepalive` |
//!
//! Section names and keys are case-insensitive, `#` starts a comment, and
//! `Address`, `DNS` and `AllowedIPs` may be repeated or comma-separated.
//!
//! ```
//! use wgi_quick::{parse, ParseError};
//!
//! let result = parse("[Interface]\nAddress = 10.0.0.2/32\n", "home");
//! assert!(matches!(result, Err(ParseError::MissingKey { .. })));
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

mod error;
mod parser;

pub use error::{ParseError, Section};
pub use parser::parse;
