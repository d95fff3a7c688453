//! Catalogue access for the CLI

use anyhow::{anyhow, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use researchbank_common::{source_from_location, Catalogue, CatalogueItem, CatalogueStore};

/// Reads the catalogue from a file path or URL
pub struct CatalogueClient {
    store: CatalogueStore,
}

impl CatalogueClient {
    pub fn new(location: &str) -> Result<Self> {
        let source = source_from_location(location)?;
        debug!("Using catalogue {}", source.describe());
        Ok(Self {
            store: CatalogueStore::new(source, Duration::ZERO),
        })
    }

    pub async fn catalogue(&self) -> Result<Arc<Catalogue>> {
        Ok(self.store.catalogue().await?)
    }

    /// Get an item by id
    pub async fn item(&self, id: &str) -> Result<CatalogueItem> {
        self.store
            .fetch_catalogue_item(id)
            .await?
            .ok_or_else(|| anyhow!("No catalogue item with id {:?}", id))
    }
}
