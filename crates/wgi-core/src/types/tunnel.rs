//! Parsed WireGuard tunnel configurations.
//!
//! A [`TunnelConfig`] is the structured form of one wg-quick configuration
//! file plus the name it will be imported under. Values are immutable once
//! produced by a parser.

use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::error::{AddressError, KeyError};

/// Length of a raw WireGuard key in bytes.
const KEY_LEN: usize = 32;

/// A WireGuard private, public or preshared key.
///
/// Stored as raw bytes, written and read as standard base64.
///
/// # Examples
///
/// ```
/// use wgi_core::WgKey;
///
/// let key = WgKey::from_base64("yAnz5TF+lXXJte14tji3zlMNq+hd2rYUIgJBgB3fBmk=").unwrap();
/// assert_eq!(key.to_base64(), "yAnz5TF+lXXJte14tji3zlMNq+hd2rYUIgJBgB3fBmk=");
/// assert!(WgKey::from_base64("too-short").is_err());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WgKey([u8; KEY_LEN]);

impl WgKey {
    /// Decodes a key from its base64 text form.
    pub fn from_base64(text: &str) -> Result<Self, KeyError> {
        let bytes = STANDARD.decode(text.trim()).map_err(|_| KeyError)?;
        let raw: [u8; KEY_LEN] = bytes.try_into().map_err(|_| KeyError)?;
        Ok(Self(raw))
    }

    /// Encodes the key as base64.
    #[must_use]
    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.0)
    }

    /// Returns the raw key bytes.
    #[inline]
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

// Keys are secrets; never print them through Debug.
impl fmt::Debug for WgKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("WgKey(..)")
    }
}

impl TryFrom<String> for WgKey {
    type Error = KeyError;

    fn try_from(text: String) -> Result<Self, Self::Error> {
        Self::from_base64(&text)
    }
}

impl From<WgKey> for String {
    fn from(key: WgKey) -> Self {
        key.to_base64()
    }
}

/// An IP address with a prefix length, as used by `Address` and `AllowedIPs`.
///
/// A bare address gets the full prefix length of its family.
///
/// # Examples
///
/// ```
/// use wgi_core::IpCidr;
///
/// let cidr: IpCidr = "10.0.0.2/24".parse().unwrap();
/// assert_eq!(cidr.prefix, 24);
///
/// let host: IpCidr = "fd00::2".parse().unwrap();
/// assert_eq!(host.prefix, 128);
/// assert_eq!(host.to_string(), "fd00::2/128");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct IpCidr {
    /// The address.
    pub addr: IpAddr,
    /// The prefix length in bits.
    pub prefix: u8,
}

impl IpCidr {
    const fn max_prefix(addr: IpAddr) -> u8 {
        match addr {
            IpAddr::V4(_) => 32,
            IpAddr::V6(_) => 128,
        }
    }
}

impl FromStr for IpCidr {
    type Err = AddressError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let text = text.trim();
        let (addr_part, prefix_part) = match text.split_once('/') {
            Some((addr, prefix)) => (addr, Some(prefix)),
            None => (text, None),
        };
        let addr: IpAddr = addr_part
            .parse()
            .map_err(|_| AddressError::InvalidIp(text.to_owned()))?;
        let max = Self::max_prefix(addr);
        let prefix = match prefix_part {
            Some(p) => p
                .parse::<u8>()
                .ok()
                .filter(|p| *p <= max)
                .ok_or_else(|| AddressError::InvalidPrefix(text.to_owned()))?,
            None => max,
        };
        Ok(Self { addr, prefix })
    }
}

impl fmt::Display for IpCidr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.addr, self.prefix)
    }
}

impl TryFrom<String> for IpCidr {
    type Error = AddressError;

    fn try_from(text: String) -> Result<Self, Self::Error> {
        text.parse()
    }
}

impl From<IpCidr> for String {
    fn from(cidr: IpCidr) -> Self {
        cidr.to_string()
    }
}

/// A peer endpoint: a host name or IP address plus a UDP port.
///
/// IPv6 literals are written in brackets.
///
/// # Examples
///
/// ```
/// use wgi_core::Endpoint;
///
/// let ep: Endpoint = "[2001:db8::1]:51820".parse().unwrap();
/// assert_eq!(ep.host, "2001:db8::1");
/// assert_eq!(ep.port, 51820);
/// assert_eq!(ep.to_string(), "[2001:db8::1]:51820");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Endpoint {
    /// Host name or IP address, without brackets.
    pub host: String,
    /// UDP port.
    pub port: u16,
}

impl FromStr for Endpoint {
    type Err = AddressError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let text = text.trim();
        let invalid = || AddressError::InvalidEndpoint(text.to_owned());

        let (host, port) = if let Some(rest) = text.strip_prefix('[') {
            let (host, port) = rest.split_once("]:").ok_or_else(invalid)?;
            if host.parse::<std::net::Ipv6Addr>().is_err() {
                return Err(invalid());
            }
            (host, port)
        } else {
            let (host, port) = text.rsplit_once(':').ok_or_else(invalid)?;
            if host.contains(':') {
                return Err(invalid());
            }
            (host, port)
        };

        if host.is_empty() {
            return Err(invalid());
        }
        let port = port.parse::<u16>().map_err(|_| invalid())?;
        Ok(Self {
            host: host.to_owned(),
            port,
        })
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

impl TryFrom<String> for Endpoint {
    type Error = AddressError;

    fn try_from(text: String) -> Result<Self, Self::Error> {
        text.parse()
    }
}

impl From<Endpoint> for String {
    fn from(endpoint: Endpoint) -> Self {
        endpoint.to_string()
    }
}

/// The `[Interface]` section of a tunnel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceConfig {
    /// The interface private key.
    pub private_key: WgKey,
    /// Addresses assigned to the interface.
    pub addresses: SmallVec<[IpCidr; 2]>,
    /// Fixed listen port, if any.
    pub listen_port: Option<u16>,
    /// Interface MTU, if any.
    pub mtu: Option<u16>,
    /// DNS servers.
    pub dns: SmallVec<[IpAddr; 2]>,
    /// DNS search domains.
    pub dns_search: Vec<String>,
}

impl InterfaceConfig {
    /// Creates an interface with only a private key set.
    #[must_use]
    pub fn new(private_key: WgKey) -> Self {
        Self {
            private_key,
            addresses: SmallVec::new(),
            listen_port: None,
            mtu: None,
            dns: SmallVec::new(),
            dns_search: Vec::new(),
        }
    }
}

/// One `[Peer]` section of a tunnel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerConfig {
    /// The peer public key.
    pub public_key: WgKey,
    /// Optional preshared key.
    pub preshared_key: Option<WgKey>,
    /// Networks routed to this peer.
    pub allowed_ips: SmallVec<[IpCidr; 2]>,
    /// Where to reach the peer, if known.
    pub endpoint: Option<Endpoint>,
    /// Keepalive interval in seconds.
    pub persistent_keepalive: Option<u16>,
}

impl PeerConfig {
    /// Creates a peer with only a public key set.
    #[must_use]
    pub fn new(public_key: WgKey) -> Self {
        Self {
            public_key,
            preshared_key: None,
            allowed_ips: SmallVec::new(),
            endpoint: None,
            persistent_keepalive: None,
        }
    }
}

/// A parsed tunnel configuration and the name it is imported under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TunnelConfig {
    /// Display name of the tunnel.
    pub name: String,
    /// The interface section.
    pub interface: InterfaceConfig,
    /// Peer sections in file order.
    pub peers: Vec<PeerConfig>,
}

impl TunnelConfig {
    /// Creates a tunnel configuration.
    #[must_use]
    pub fn new(name: impl Into<String>, interface: InterfaceConfig, peers: Vec<PeerConfig>) -> Self {
        Self {
            name: name.into(),
            interface,
            peers,
        }
    }
}
