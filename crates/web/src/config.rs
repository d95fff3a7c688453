//! Web server configuration

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use researchbank_common::{Error, Result};

/// Prefix the site is mounted under by default
pub const DEFAULT_URL_PREFIX: &str = "/my-ai4d-research-bank";

/// Web server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    /// Listen address
    pub listen: String,

    /// Path or URL of `catalog.json`
    pub catalog: String,

    /// Path prefix every page is served under
    pub url_prefix: String,

    /// Seconds a fetched catalogue is reused; 0 refetches per request
    pub cache_ttl_secs: u64,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            listen: "127.0.0.1:8080".to_string(),
            catalog: "data/catalog.json".to_string(),
            url_prefix: DEFAULT_URL_PREFIX.to_string(),
            cache_ttl_secs: 60,
        }
    }
}

/// Values given on the command line or through the environment; each one
/// set replaces the file value
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub listen: Option<String>,
    pub catalog: Option<String>,
    pub url_prefix: Option<String>,
    pub cache_ttl_secs: Option<u64>,
}

impl WebConfig {
    /// Load the file at `path` (defaults when absent) and apply `overrides`
    pub fn resolve(path: &Path, overrides: ConfigOverrides) -> anyhow::Result<Self> {
        Ok(Self::load(path)?.with_overrides(overrides))
    }

    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(listen) = overrides.listen {
            self.listen = listen;
        }
        if let Some(catalog) = overrides.catalog {
            self.catalog = catalog;
        }
        if let Some(prefix) = overrides.url_prefix {
            self.url_prefix = prefix;
        }
        if let Some(ttl) = overrides.cache_ttl_secs {
            self.cache_ttl_secs = ttl;
        }
        self
    }

    /// Load configuration from a TOML file, or defaults when it does not exist
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = toml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.listen
            .parse()
            .map_err(|e| Error::InvalidConfig(format!("listen address {:?}: {}", self.listen, e)))
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Normalised prefix: leading `/`, no trailing `/`, empty for the root
    pub fn prefix(&self) -> Result<String> {
        normalize_prefix(&self.url_prefix)
    }
}

pub fn normalize_prefix(raw: &str) -> Result<String> {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        return Ok(String::new());
    }
    let valid = trimmed
        .split('/')
        .all(|seg| !seg.is_empty() && seg.chars().all(|c| c.is_ascii_alphanumeric() || "-_.~".contains(c)));
    if !valid {
        return Err(Error::InvalidConfig(format!("invalid URL prefix: {:?}", raw)));
    }
    Ok(format!("/{}", trimmed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_normalize_prefix() {
        assert_eq!(normalize_prefix("/my-ai4d-research-bank").unwrap(), "/my-ai4d-research-bank");
        assert_eq!(normalize_prefix("my-ai4d-research-bank/").unwrap(), "/my-ai4d-research-bank");
        assert_eq!(normalize_prefix("/").unwrap(), "");
        assert_eq!(normalize_prefix("").unwrap(), "");
        assert_eq!(normalize_prefix("/a/b").unwrap(), "/a/b");
    }

    #[test]
    fn test_invalid_prefix() {
        assert!(normalize_prefix("/has space").is_err());
        assert!(normalize_prefix("/a//b").is_err());
        assert!(normalize_prefix("/q?x=1").is_err());
    }

    #[test]
    fn test_load_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "catalog = \"https://example.org/api/data/catalog.json\"").unwrap();
        writeln!(file, "cache_ttl_secs = 0").unwrap();

        let config = WebConfig::load(file.path()).unwrap();
        assert_eq!(config.catalog, "https://example.org/api/data/catalog.json");
        assert_eq!(config.cache_ttl(), Duration::ZERO);
        assert_eq!(config.url_prefix, DEFAULT_URL_PREFIX);
        assert_eq!(config.listen, "127.0.0.1:8080");
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = WebConfig::load(&dir.path().join("web.toml")).unwrap();
        assert_eq!(config.cache_ttl_secs, 60);
    }

    #[test]
    fn test_overrides_beat_file_and_file_beats_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "listen = \"0.0.0.0:9000\"").unwrap();
        writeln!(file, "url_prefix = \"/bank\"").unwrap();
        writeln!(file, "cache_ttl_secs = 5").unwrap();

        let config = WebConfig::resolve(
            file.path(),
            ConfigOverrides {
                url_prefix: Some("/".to_string()),
                cache_ttl_secs: Some(0),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(config.listen, "0.0.0.0:9000");
        assert_eq!(config.prefix().unwrap(), "");
        assert_eq!(config.cache_ttl_secs, 0);
        assert_eq!(config.catalog, "data/catalog.json");
    }

    #[test]
    fn test_overrides_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = WebConfig::resolve(
            &dir.path().join("web.toml"),
            ConfigOverrides {
                catalog: Some("https://example.org/catalog.json".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(config.catalog, "https://example.org/catalog.json");
        assert_eq!(config.url_prefix, DEFAULT_URL_PREFIX);
        assert_eq!(WebConfig::default().with_overrides(ConfigOverrides::default()).listen, "127.0.0.1:8080");
    }

    #[test]
    fn test_listen_addr() {
        let mut config = WebConfig::default();
        assert!(config.listen_addr().is_ok());
        config.listen = "not-an-addr".to_string();
        assert!(matches!(config.listen_addr(), Err(Error::InvalidConfig(_))));
    }
}
