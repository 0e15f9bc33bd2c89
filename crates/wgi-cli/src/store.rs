//! JSON file backed tunnel store.

use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use wgi_core::{CommitReport, TunnelConfig};
use wgi_importer::{TunnelCollection, TunnelStore};

/// On-disk layout of the store file.
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile {
    #[serde(default)]
    tunnels: Vec<TunnelConfig>,
}

/// A [`TunnelCollection`] loaded from, and saved back to, a JSON file.
///
/// A missing file is treated as an empty store. Nothing is written until
/// [`save`](Self::save) is called.
#[derive(Debug)]
pub struct JsonFileStore {
    path: Utf8PathBuf,
    collection: TunnelCollection,
}

impl JsonFileStore {
    /// Opens the store at `path`.
    pub fn open(path: &Utf8Path) -> Result<Self> {
        let file = if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read tunnel store {path}"))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("failed to parse tunnel store {path}"))?
        } else {
            debug!(path = %path, "Tunnel store does not exist yet");
            StoreFile::default()
        };

        Ok(Self {
            path: path.to_owned(),
            collection: TunnelCollection::from_tunnels(file.tunnels),
        })
    }

    /// Returns every stored tunnel.
    pub fn tunnels(&self) -> Vec<TunnelConfig> {
        self.collection.tunnels()
    }

    /// Writes the store back to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {parent}"))?;
        }

        let file = StoreFile {
            tunnels: self.collection.tunnels(),
        };
        let json = serde_json::to_string_pretty(&file).context("failed to serialize tunnel store")?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("failed to write tunnel store {}", self.path))?;

        info!(path = %self.path, tunnels = file.tunnels.len(), "Saved tunnel store");
        Ok(())
    }
}

impl TunnelStore for JsonFileStore {
    fn add_multiple(&self, configs: Vec<TunnelConfig>) -> CommitReport {
        self.collection.add_multiple(configs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use wgi_core::{InterfaceConfig, WgKey};

    fn tunnel(name: &str) -> TunnelConfig {
        let key = WgKey::from_base64("yAnz5TF+lXXJte14tji3zlMNq+hd2rYUIgJBgB3fBmk=").unwrap();
        TunnelConfig::new(name, InterfaceConfig::new(key), Vec::new())
    }

    fn store_path(dir: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(dir.path().join("nested").join("tunnels.json")).unwrap()
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::open(&store_path(&dir)).unwrap();
        assert!(store.tunnels().is_empty());
    }

    #[test]
    fn test_save_and_reopen() {
        let dir = TempDir::new().unwrap();
        let path = store_path(&dir);

        let store = JsonFileStore::open(&path).unwrap();
        let report = store.add_multiple(vec![tunnel("home"), tunnel("office")]);
        assert_eq!(report.number_successful, 2);
        store.save().unwrap();

        let reopened = JsonFileStore::open(&path).unwrap();
        let names: Vec<String> = reopened.tunnels().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["home", "office"]);

        let report = reopened.add_multiple(vec![tunnel("home")]);
        assert_eq!(report.number_successful, 0);
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = Utf8PathBuf::from_path_buf(dir.path().join("tunnels.json")).unwrap();
        std::fs::write(&path, "{ not json").unwrap();
        let err = JsonFileStore::open(&path).unwrap_err();
        assert!(err.to_string().contains("failed to parse tunnel store"));
    }
}
