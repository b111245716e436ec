//! Configuration management.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use pocketbar_fetch::{
    CredentialChain, EnvSource, KeychainApi, KeychainSource, StaticSource, DEFAULT_BASE_URL,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::StoreError;

/// Shortest host trigger interval accepted.
const MIN_SCAN_INTERVAL_SECS: u64 = 1;

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,
    /// `PocketSmith` settings.
    #[serde(default)]
    pub pocketsmith: PocketSmithConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Seconds between refresh requests issued by the host loop.
    #[serde(default = "default_scan_interval")]
    pub scan_interval_secs: u64,
    /// Log level.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// `PocketSmith` connection settings.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct PocketSmithConfig {
    /// Developer key. Prefer the keychain or the environment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub developer_key: Option<String>,
    /// API base URL override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base_url: Option<String>,
}

impl fmt::Debug for PocketSmithConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PocketSmithConfig")
            .field("developer_key", &self.developer_key.as_ref().map(|_| "***"))
            .field("api_base_url", &self.api_base_url)
            .finish()
    }
}

fn default_scan_interval() -> u64 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            scan_interval_secs: default_scan_interval(),
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("pocketbar")
            .join("config.json")
    }

    /// Loads configuration from the default path.
    pub fn load() -> Result<Self, StoreError> {
        Self::load_from(&Self::default_path())
    }

    /// Loads configuration from a specific path. A missing file yields the
    /// defaults.
    pub fn load_from(path: &Path) -> Result<Self, StoreError> {
        if !path.exists() {
            debug!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;

        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Saves configuration to the default path.
    pub fn save(&self) -> Result<(), StoreError> {
        self.save_to(&Self::default_path())
    }

    /// Saves configuration to a specific path, readable by the owner only.
    pub fn save_to(&self, path: &Path) -> Result<(), StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        set_restrictive_permissions(path)?;

        info!(path = %path.display(), "Saved configuration");
        Ok(())
    }

    /// Checks values that serde cannot.
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.general.scan_interval_secs < MIN_SCAN_INTERVAL_SECS {
            return Err(StoreError::Config(format!(
                "scan_interval_secs must be at least {MIN_SCAN_INTERVAL_SECS}"
            )));
        }
        if let Some(url) = &self.pocketsmith.api_base_url {
            if !(url.starts_with("https://") || url.starts_with("http://")) {
                return Err(StoreError::Config(format!(
                    "api_base_url is not an http(s) URL: {url}"
                )));
            }
        }
        Ok(())
    }

    /// Returns the host trigger interval.
    pub fn scan_interval(&self) -> Duration {
        Duration::from_secs(self.general.scan_interval_secs.max(MIN_SCAN_INTERVAL_SECS))
    }

    /// Returns the API base URL.
    pub fn api_base_url(&self) -> &str {
        self.pocketsmith
            .api_base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL)
    }

    /// Builds the developer key lookup: explicit value, environment, this
    /// config file, then the keychain.
    pub fn credential_chain(
        &self,
        explicit: Option<String>,
        keychain: Arc<dyn KeychainApi>,
    ) -> CredentialChain {
        CredentialChain::new()
            .with(StaticSource::new("flag", explicit))
            .with(EnvSource::default())
            .with(StaticSource::new("config", self.pocketsmith.developer_key.clone()))
            .with(KeychainSource::new(keychain))
    }
}

#[cfg(unix)]
fn set_restrictive_permissions(path: &Path) -> Result<(), StoreError> {
    use std::os::unix::fs::PermissionsExt;

    let mut perms = std::fs::metadata(path)?.permissions();
    perms.set_mode(0o600);
    std::fs::set_permissions(path, perms)?;
    Ok(())
}

#[cfg(not(unix))]
fn set_restrictive_permissions(_path: &Path) -> Result<(), StoreError> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pocketbar_fetch::{CredentialSource, KeychainError};
    use tempfile::TempDir;

    struct EmptyKeychain;

    #[async_trait]
    impl KeychainApi for EmptyKeychain {
        async fn get(&self, _: &str, _: &str) -> Result<Option<String>, KeychainError> {
            Ok(None)
        }

        async fn set(&self, _: &str, _: &str, _: &str) -> Result<(), KeychainError> {
            Ok(())
        }

        async fn delete(&self, _: &str, _: &str) -> Result<(), KeychainError> {
            Ok(())
        }
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("nope.json")).unwrap();
        assert_eq!(config.scan_interval(), Duration::from_secs(30));
        assert_eq!(config.api_base_url(), DEFAULT_BASE_URL);
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let mut config = Config::default();
        config.general.scan_interval_secs = 90;
        config.pocketsmith.api_base_url = Some("http://127.0.0.1:9000/v2".to_string());
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.scan_interval(), Duration::from_secs(90));
        assert_eq!(loaded.api_base_url(), "http://127.0.0.1:9000/v2");
    }

    #[cfg(unix)]
    #[test]
    fn test_saved_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        Config::default().save_to(&path).unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"pocketsmith": {"developer_key": "abc"}}"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.general.scan_interval_secs, 30);
        assert_eq!(config.pocketsmith.developer_key.as_deref(), Some("abc"));
    }

    #[test]
    fn test_zero_interval_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"general": {"scan_interval_secs": 0}}"#).unwrap();

        assert!(matches!(Config::load_from(&path), Err(StoreError::Config(_))));
    }

    #[test]
    fn test_debug_redacts_key() {
        let mut config = Config::default();
        config.pocketsmith.developer_key = Some("super-secret".to_string());
        assert!(!format!("{config:?}").contains("super-secret"));
    }

    #[tokio::test]
    async fn test_explicit_key_beats_config() {
        let mut config = Config::default();
        config.pocketsmith.developer_key = Some("from-config".to_string());

        let chain =
            config.credential_chain(Some("from-flag".to_string()), Arc::new(EmptyKeychain));
        assert_eq!(chain.len(), 4);
        assert_eq!(chain.resolve().await.unwrap().unwrap().expose(), "from-flag");
    }
}
