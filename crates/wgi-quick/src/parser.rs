//! Line-oriented wg-quick parser.
//!
//! Parsing happens in two passes. The first pass splits the text into
//! sections and collects raw `key = value` attributes per section, rejecting
//! unknown keys and repeated scalar keys. The second pass converts each
//! section's attributes into typed [`InterfaceConfig`] / [`PeerConfig`] values.

use std::net::IpAddr;

use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;
use wgi_core::{InterfaceConfig, IpCidr, PeerConfig, TunnelConfig, WgKey};

use crate::error::{ParseError, Section};

/// Keys accepted in `[Interface]`, with whether they hold a comma-separated list.
const INTERFACE_KEYS: &[(&str, bool)] = &[
    ("PrivateKey", false),
    ("Address", true),
    ("ListenPort", false),
    ("MTU", false),
    ("DNS", true),
];

/// Keys accepted in `[Peer]`, with whether they hold a comma-separated list.
const PEER_KEYS: &[(&str, bool)] = &[
    ("PublicKey", false),
    ("PresharedKey", false),
    ("AllowedIPs", true),
    ("Endpoint", false),
    ("PersistentKeepalive", false),
];

/// Raw attributes of one section, keyed by canonical key name.
struct Attributes<'a> {
    section: Section,
    values: FxHashMap<&'static str, SmallVec<[&'a str; 2]>>,
}

impl<'a> Attributes<'a> {
    fn new(section: Section) -> Self {
        Self {
            section,
            values: FxHashMap::default(),
        }
    }

    fn insert(&mut self, key: &str, value: &'a str) -> Result<bool, ParseError> {
        let table = match self.section {
            Section::Interface => INTERFACE_KEYS,
            Section::Peer => PEER_KEYS,
        };
        let Some(&(canonical, is_list)) = table.iter().find(|(k, _)| k.eq_ignore_ascii_case(key))
        else {
            return Ok(false);
        };

        let entry = self.values.entry(canonical).or_default();
        if is_list {
            entry.extend(value.split(',').map(str::trim).filter(|v| !v.is_empty()));
        } else {
            if !entry.is_empty() {
                return Err(ParseError::DuplicateKey {
                    section: self.section,
                    key: key.to_owned(),
                });
            }
            entry.push(value);
        }
        Ok(true)
    }

    fn single(&self, key: &'static str) -> Option<&'a str> {
        self.values.get(key).and_then(|v| v.first().copied())
    }

    fn list(&self, key: &'static str) -> &[&'a str] {
        self.values
            .get(key)
            .map(SmallVec::as_slice)
            .unwrap_or_default()
    }

    fn key(&self, key: &'static str) -> Result<Option<WgKey>, ParseError> {
        self.single(key)
            .map(|text| {
                WgKey::from_base64(text).map_err(|_| ParseError::InvalidKey {
                    section: self.section,
                    key,
                })
            })
            .transpose()
    }

    fn number(&self, key: &'static str) -> Result<Option<u16>, ParseError> {
        self.single(key)
            .map(|text| {
                text.parse::<u16>().map_err(|_| ParseError::InvalidNumber {
                    section: self.section,
                    key,
                    value: text.to_owned(),
                })
            })
            .transpose()
    }

    fn cidrs(&self, key: &'static str) -> Result<SmallVec<[IpCidr; 2]>, ParseError> {
        self.list(key)
            .iter()
            .map(|text| {
                text.parse::<IpCidr>()
                    .map_err(|source| ParseError::InvalidAddress {
                        section: self.section,
                        key,
                        source,
                    })
            })
            .collect()
    }
}

/// Parses wg-quick configuration text into a [`TunnelConfig`] called `name`.
///
/// # Errors
///
/// Returns a [`ParseError`] describing the first problem found.
///
/// # Examples
///
/// ```
/// use wgi_quick::parse;
///
/// let text = "\
/// [Interface]
/// PrivateKey = yAnz5TF+lXXJte14tji3zlMNq+hd2rYUIgJBgB3fBmk=
/// Address = 10.0.0.2/32
///
/// [Peer]
/// PublicKey = xTIBA5rboUvnH4htodjb6e697QjLERt1NAB4mZqp8Dg=
/// AllowedIPs = 0.0.0.0/0, ::/0
/// Endpoint = demo.wireguard.com:51820
/// ";
///
/// let tunnel = parse(text, "demo")?;
/// assert_eq!(tunnel.name, "demo");
/// assert_eq!(tunnel.peers.len(), 1);
/// assert_eq!(tunnel.peers[0].allowed_ips.len(), 2);
/// # Ok::<(), wgi_quick::ParseError>(())
/// ```
pub fn parse(text: &str, name: &str) -> Result<TunnelConfig, ParseError> {
    let mut interface: Option<Attributes<'_>> = None;
    let mut peers: Vec<Attributes<'_>> = Vec::new();
    let mut current: Option<Attributes<'_>> = None;

    for (index, raw_line) in text.lines().enumerate() {
        let line = strip_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }
        let invalid = || ParseError::InvalidLine {
            line: index + 1,
            text: line.to_owned(),
        };

        if line.starts_with('[') {
            if let Some(done) = current.take() {
                finish_section(done, &mut interface, &mut peers)?;
            }
            let section = if line.eq_ignore_ascii_case("[interface]") {
                Section::Interface
            } else if line.eq_ignore_ascii_case("[peer]") {
                Section::Peer
            } else {
                return Err(invalid());
            };
            current = Some(Attributes::new(section));
            continue;
        }

        let Some(attributes) = current.as_mut() else {
            return Err(invalid());
        };
        let Some((key, value)) = line.split_once('=') else {
            return Err(invalid());
        };
        if !attributes.insert(key.trim(), value.trim())? {
            return Err(invalid());
        }
    }

    if let Some(done) = current.take() {
        finish_section(done, &mut interface, &mut peers)?;
    }

    let interface = build_interface(&interface.ok_or(ParseError::NoInterface)?)?;

    let mut seen_keys: FxHashSet<WgKey> = FxHashSet::default();
    let mut built_peers = Vec::with_capacity(peers.len());
    for attributes in &peers {
        let peer = build_peer(attributes)?;
        if !seen_keys.insert(peer.public_key) {
            return Err(ParseError::DuplicatePeerKey);
        }
        built_peers.push(peer);
    }

    Ok(TunnelConfig::new(name, interface, built_peers))
}

fn strip_comment(line: &str) -> &str {
    line.split_once('#').map_or(line, |(before, _)| before)
}

fn finish_section<'a>(
    done: Attributes<'a>,
    interface: &mut Option<Attributes<'a>>,
    peers: &mut Vec<Attributes<'a>>,
) -> Result<(), ParseError> {
    match done.section {
        Section::Interface => {
            if interface.is_some() {
                return Err(ParseError::MultipleInterfaces);
            }
            *interface = Some(done);
        }
        Section::Peer => peers.push(done),
    }
    Ok(())
}

fn build_interface(attributes: &Attributes<'_>) -> Result<InterfaceConfig, ParseError> {
    let private_key = attributes
        .key("PrivateKey")?
        .ok_or(ParseError::MissingKey {
            section: Section::Interface,
            key: "PrivateKey",
        })?;

    let mut interface = InterfaceConfig::new(private_key);
    interface.addresses = attributes.cidrs("Address")?;
    interface.listen_port = attributes.number("ListenPort")?;
    interface.mtu = attributes.number("MTU")?;

    for entry in attributes.list("DNS") {
        match entry.parse::<IpAddr>() {
            Ok(addr) => interface.dns.push(addr),
            Err(_) => interface.dns_search.push((*entry).to_owned()),
        }
    }

    Ok(interface)
}

fn build_peer(attributes: &Attributes<'_>) -> Result<PeerConfig, ParseError> {
    let public_key = attributes.key("PublicKey")?.ok_or(ParseError::MissingKey {
        section: Section::Peer,
        key: "PublicKey",
    })?;

    let mut peer = PeerConfig::new(public_key);
    peer.preshared_key = attributes.key("PresharedKey")?;
    peer.allowed_ips = attributes.cidrs("AllowedIPs")?;
    peer.endpoint = attributes
        .single("Endpoint")
        .map(|text| {
            text.parse().map_err(|source| ParseError::InvalidAddress {
                section: Section::Peer,
                key: "Endpoint",
                source,
            })
        })
        .transpose()?;

    // "off" is how wg-quick spells a disabled keepalive
    peer.persistent_keepalive = match attributes.single("PersistentKeepalive") {
        Some(text) if text.eq_ignore_ascii_case("off") => None,
        _ => attributes.number("PersistentKeepalive")?.filter(|n| *n > 0),
    };

    Ok(peer)
}
