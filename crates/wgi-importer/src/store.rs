//! The bulk commit seam and an in-memory tunnel collection.

use parking_lot::RwLock;
use rustc_hash::FxHashSet;
use tracing::{debug, info};
use wgi_core::{CommitReport, ImportError, ImportErrorKind, TunnelConfig};

use crate::messages;

/// A managed collection that imported tunnels are committed into.
///
/// `add_multiple` is called once per import, after every source has been
/// processed, on the task that called
/// [`TunnelImporter::import`](crate::TunnelImporter::import).
pub trait TunnelStore {
    /// Adds as many of `configs` as the store accepts.
    ///
    /// `number_successful` in the report must not exceed `configs.len()`, and
    /// `last_rejection` should be set whenever it is smaller.
    fn add_multiple(&self, configs: Vec<TunnelConfig>) -> CommitReport;
}

#[derive(Debug, Default)]
struct Inner {
    tunnels: Vec<TunnelConfig>,
    names: FxHashSet<String>,
}

/// An in-memory tunnel store keyed by tunnel name.
///
/// Rejects tunnels with blank names and tunnels whose name is already taken;
/// everything else is appended in the order given.
///
/// # Examples
///
/// ```
/// use wgi_importer::{TunnelCollection, TunnelStore};
///
/// let store = TunnelCollection::new();
/// let report = store.add_multiple(Vec::new());
/// assert_eq!(report.number_successful, 0);
/// assert!(store.is_empty());
/// ```
#[derive(Debug, Default)]
pub struct TunnelCollection {
    inner: RwLock<Inner>,
}

impl TunnelCollection {
    /// Creates an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a collection holding existing tunnels.
    ///
    /// Later tunnels with a name already seen are dropped.
    #[must_use]
    pub fn from_tunnels(tunnels: Vec<TunnelConfig>) -> Self {
        let mut inner = Inner::default();
        for tunnel in tunnels {
            if inner.names.insert(tunnel.name.clone()) {
                inner.tunnels.push(tunnel);
            }
        }
        Self {
            inner: RwLock::new(inner),
        }
    }

    /// Number of tunnels held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().tunnels.len()
    }

    /// Returns `true` if no tunnels are held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.read().tunnels.is_empty()
    }

    /// Returns `true` if a tunnel with this name exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.inner.read().names.contains(name)
    }

    /// Returns a copy of every tunnel, in insertion order.
    #[must_use]
    pub fn tunnels(&self) -> Vec<TunnelConfig> {
        self.inner.read().tunnels.clone()
    }

    /// Consumes the collection and returns its tunnels.
    #[must_use]
    pub fn into_tunnels(self) -> Vec<TunnelConfig> {
        self.inner.into_inner().tunnels
    }
}

impl TunnelStore for TunnelCollection {
    fn add_multiple(&self, configs: Vec<TunnelConfig>) -> CommitReport {
        let total = configs.len();
        let mut inner = self.inner.write();
        let mut report = CommitReport::default();

        for config in configs {
            let alert = if config.name.trim().is_empty() {
                messages::tunnel_name_empty()
            } else if inner.names.contains(&config.name) {
                messages::tunnel_already_exists()
            } else {
                inner.names.insert(config.name.clone());
                inner.tunnels.push(config);
                report.number_successful += 1;
                continue;
            };

            debug!(name = %config.name, reason = %alert.title, "Rejected tunnel");
            report.last_rejection = Some(ImportError {
                kind: ImportErrorKind::CommitRejected,
                alert,
            });
        }

        info!(added = report.number_successful, total, "Committed tunnels");
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wgi_core::{InterfaceConfig, WgKey};

    fn tunnel(name: &str) -> TunnelConfig {
        let key = WgKey::from_base64("yAnz5TF+lXXJte14tji3zlMNq+hd2rYUIgJBgB3fBmk=").unwrap();
        TunnelConfig::new(name, InterfaceConfig::new(key), Vec::new())
    }

    #[test]
    fn test_add_all() {
        let store = TunnelCollection::new();
        let report = store.add_multiple(vec![tunnel("a"), tunnel("b")]);
        assert_eq!(report, CommitReport::all_added(2));
        assert_eq!(store.len(), 2);
        assert!(store.contains("b"));
    }

    #[test]
    fn test_rejects_duplicates_and_blank_names() {
        let store = TunnelCollection::from_tunnels(vec![tunnel("home")]);
        let report = store.add_multiple(vec![tunnel("office"), tunnel("  "), tunnel("home")]);
        assert_eq!(report.number_successful, 1);
        let rejection = report.last_rejection.unwrap();
        assert_eq!(rejection.kind, ImportErrorKind::CommitRejected);
        assert_eq!(rejection.alert, messages::tunnel_already_exists());
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_duplicates_within_batch() {
        let store = TunnelCollection::new();
        let report = store.add_multiple(vec![tunnel("a"), tunnel("a")]);
        assert_eq!(report.number_successful, 1);
        assert!(report.last_rejection.is_some());
    }

    #[test]
    fn test_into_tunnels_keeps_order() {
        let store = TunnelCollection::from_tunnels(vec![tunnel("b"), tunnel("a"), tunnel("b")]);
        let names: Vec<String> = store.into_tunnels().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["b", "a"]);
    }
}
