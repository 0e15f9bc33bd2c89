//! Configuration structures for the wg-import tool.
//!
//! - [`ImportConfig`] - Import orchestration settings (concurrency, deadlines, extensions)
//! - [`StoreConfig`] - Where the command-line tool keeps its tunnel collection
//! - [`Config`] - Root configuration combining all settings
//!
//! All configuration types implement [`Default`], so a configuration file only
//! needs to name the options it changes.

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Largest accepted `max_concurrent_sources`; the permit limit of tokio's semaphore.
pub const MAX_CONCURRENT_SOURCES: usize = usize::MAX >> 3;

/// Configuration for an import run.
///
/// # Examples
///
/// ```
/// use wgi_core::ImportConfig;
///
/// let config = ImportConfig::default();
/// assert_eq!(config.archive_extension, "zip");
/// assert!(config.unit_timeout_ms.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// Maximum number of sources processed at the same time.
    /// `None` means every source starts immediately.
    pub max_concurrent_sources: Option<usize>,

    /// Deadline for a single source in milliseconds.
    ///
    /// `None` means a source may take as long as it needs; a hung source then
    /// stalls the whole import.
    pub unit_timeout_ms: Option<u64>,

    /// Extension (without the dot) that marks a source as an archive.
    pub archive_extension: String,

    /// Extension (without the dot) of tunnel files inside an archive.
    pub config_extension: String,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            max_concurrent_sources: None,
            unit_timeout_ms: None,
            archive_extension: "zip".to_owned(),
            config_extension: "conf".to_owned(),
        }
    }
}

impl ImportConfig {
    /// Checks option values that serde cannot reject on its own.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.max_concurrent_sources {
            Some(0) => {
                return Err(ConfigError::InvalidOption {
                    option: "max_concurrent_sources".to_owned(),
                    reason: "must be positive".to_owned(),
                });
            }
            Some(n) if n > MAX_CONCURRENT_SOURCES => {
                return Err(ConfigError::InvalidOption {
                    option: "max_concurrent_sources".to_owned(),
                    reason: format!("must be at most {MAX_CONCURRENT_SOURCES}"),
                });
            }
            _ => {}
        }
        if self.unit_timeout_ms == Some(0) {
            return Err(ConfigError::InvalidOption {
                option: "unit_timeout_ms".to_owned(),
                reason: "must be positive".to_owned(),
            });
        }
        for (option, value) in [
            ("archive_extension", &self.archive_extension),
            ("config_extension", &self.config_extension),
        ] {
            if value.is_empty() || value.starts_with('.') {
                return Err(ConfigError::InvalidOption {
                    option: option.to_owned(),
                    reason: "must be a non-empty extension without a leading dot".to_owned(),
                });
            }
        }
        Ok(())
    }
}

/// Location of the tunnel collection used by the command-line tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// JSON file holding the imported tunnels.
    pub path: Utf8PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: Utf8PathBuf::from("tunnels.json"),
        }
    }
}

/// Root configuration for the wg-import tool.
///
/// # Examples
///
/// ```
/// use wgi_core::Config;
///
/// let config = Config::default();
/// let json = serde_json::to_string_pretty(&config).unwrap();
/// assert!(json.contains("archive_extension"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Import orchestration configuration.
    pub import: ImportConfig,

    /// Tunnel store configuration.
    pub store: StoreConfig,
}

impl Config {
    /// Loads and validates a configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotFound`] if the file does not exist, and
    /// [`ConfigError::Io`], [`ConfigError::Parse`] or
    /// [`ConfigError::InvalidOption`] for unreadable, malformed or invalid files.
    pub fn load(path: &Utf8Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_owned()));
        }
        let contents = std::fs::read_to_string(path.as_std_path())?;
        let config: Self = serde_json::from_str(&contents)?;
        config.import.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_import_config_defaults() {
        let config = ImportConfig::default();
        assert_eq!(config.max_concurrent_sources, None);
        assert_eq!(config.unit_timeout_ms, None);
        assert_eq!(config.archive_extension, "zip");
        assert_eq!(config.config_extension, "conf");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_deserialize_with_missing_fields() {
        let json = r#"{"import": {"max_concurrent_sources": 4}}"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.import.max_concurrent_sources, Some(4));
        assert_eq!(config.import.archive_extension, "zip");
        assert_eq!(config.store.path, "tunnels.json");
    }

    #[test]
    fn test_validate_rejects_zero_concurrency() {
        let config = ImportConfig {
            max_concurrent_sources: Some(0),
            ..ImportConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidOption { option, .. }) if option == "max_concurrent_sources"
        ));
    }

    #[test]
    fn test_validate_concurrency_upper_bound() {
        let at_limit = ImportConfig {
            max_concurrent_sources: Some(MAX_CONCURRENT_SOURCES),
            ..ImportConfig::default()
        };
        assert!(at_limit.validate().is_ok());

        let above = ImportConfig {
            max_concurrent_sources: Some(MAX_CONCURRENT_SOURCES + 1),
            ..ImportConfig::default()
        };
        assert!(matches!(
            above.validate(),
            Err(ConfigError::InvalidOption { option, .. }) if option == "max_concurrent_sources"
        ));
    }

    #[test]
    fn test_load_rejects_oversized_concurrency() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = Utf8PathBuf::from_path_buf(dir.path().join("config.json")).unwrap();
        std::fs::write(
            &path,
            r#"{"import": {"max_concurrent_sources": 18446744073709551615}}"#,
        )
        .unwrap();

        assert!(matches!(
            Config::load(&path),
            Err(ConfigError::InvalidOption { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_dotted_extension() {
        let config = ImportConfig {
            archive_extension: ".zip".to_owned(),
            ..ImportConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let result = Config::load(Utf8Path::new("/nonexistent/wg-import.json"));
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = Utf8PathBuf::from_path_buf(dir.path().join("config.json")).unwrap();
        std::fs::write(&path, r#"{"store": {"path": "/var/lib/tunnels.json"}}"#).unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.store.path, "/var/lib/tunnels.json");
        assert_eq!(config.import, ImportConfig::default());
    }

    #[test]
    fn test_load_rejects_invalid_option() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = Utf8PathBuf::from_path_buf(dir.path().join("config.json")).unwrap();
        std::fs::write(&path, r#"{"import": {"unit_timeout_ms": 0}}"#).unwrap();

        assert!(matches!(
            Config::load(&path),
            Err(ConfigError::InvalidOption { .. })
        ));
    }
}
