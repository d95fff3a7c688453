//! Where the catalogue document comes from

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::catalogue::Catalogue;
use crate::error::{Error, Result};

/// A location the static catalogue document can be fetched from
#[async_trait]
pub trait CatalogueSource: Send + Sync {
    /// Fetch and parse the whole document
    async fn fetch(&self) -> Result<Catalogue>;

    /// Human-readable location, for logs
    fn describe(&self) -> String;
}

/// `catalog.json` on the local filesystem
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CatalogueSource for FileSource {
    async fn fetch(&self) -> Result<Catalogue> {
        debug!("Reading catalogue from {}", self.path.display());
        let bytes = tokio::fs::read(&self.path).await?;
        Catalogue::from_json(&bytes)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// `catalog.json` served over HTTP
#[derive(Debug, Clone)]
pub struct HttpSource {
    url: String,
    client: reqwest::Client,
}

impl HttpSource {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            url: url.into(),
            client,
        })
    }
}

#[async_trait]
impl CatalogueSource for HttpSource {
    async fn fetch(&self) -> Result<Catalogue> {
        debug!("Fetching catalogue from {}", self.url);
        let resp = self.client.get(&self.url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Fetch {
                location: self.url.clone(),
                status: status.as_u16(),
            });
        }
        let bytes = resp.bytes().await?;
        Catalogue::from_json(&bytes)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

/// Pick a source for a path or `http(s)://` URL
pub fn source_from_location(location: &str) -> Result<Arc<dyn CatalogueSource>> {
    let location = location.trim();
    if location.is_empty() {
        return Err(Error::InvalidConfig("catalogue location is empty".to_string()));
    }
    if location.starts_with("http://") || location.starts_with("https://") {
        Ok(Arc::new(HttpSource::new(location)?))
    } else {
        Ok(Arc::new(FileSource::new(location)))
    }
}
