//! Cached access to the catalogue document

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::catalogue::Catalogue;
use crate::error::Result;
use crate::source::CatalogueSource;
use crate::types::CatalogueItem;

struct Cached {
    catalogue: Arc<Catalogue>,
    fetched_at: Instant,
}

/// Holds the last fetched catalogue and refetches it once it is older than
/// the TTL. A zero TTL refetches on every call.
#[derive(Clone)]
pub struct CatalogueStore {
    source: Arc<dyn CatalogueSource>,
    ttl: Duration,
    cached: Arc<RwLock<Option<Cached>>>,
}

impl CatalogueStore {
    pub fn new(source: Arc<dyn CatalogueSource>, ttl: Duration) -> Self {
        Self {
            source,
            ttl,
            cached: Arc::new(RwLock::new(None)),
        }
    }

    pub fn source(&self) -> &dyn CatalogueSource {
        self.source.as_ref()
    }

    /// Current catalogue, fetching it if missing or stale.
    ///
    /// A failed refetch falls back to the previous copy; without one the
    /// error is returned.
    pub async fn catalogue(&self) -> Result<Arc<Catalogue>> {
        {
            let cached = self.cached.read().await;
            if let Some(c) = cached.as_ref() {
                if !self.ttl.is_zero() && c.fetched_at.elapsed() < self.ttl {
                    debug!("Catalogue cache hit ({} items)", c.catalogue.len());
                    return Ok(c.catalogue.clone());
                }
            }
        }

        let mut cached = self.cached.write().await;
        // another request may have refreshed while we waited for the lock
        if let Some(c) = cached.as_ref() {
            if !self.ttl.is_zero() && c.fetched_at.elapsed() < self.ttl {
                return Ok(c.catalogue.clone());
            }
        }

        match self.source.fetch().await {
            Ok(catalogue) => {
                info!(
                    "Loaded {} catalogue items from {}",
                    catalogue.len(),
                    self.source.describe()
                );
                let catalogue = Arc::new(catalogue);
                *cached = Some(Cached {
                    catalogue: catalogue.clone(),
                    fetched_at: Instant::now(),
                });
                Ok(catalogue)
            }
            Err(e) => match cached.as_ref() {
                Some(stale) => {
                    warn!(
                        "Failed to refresh catalogue from {}: {} (serving previous copy)",
                        self.source.describe(),
                        e
                    );
                    Ok(stale.catalogue.clone())
                }
                None => Err(e),
            },
        }
    }

    /// Look up one item; `None` when the id is unknown
    pub async fn fetch_catalogue_item(&self, id: &str) -> Result<Option<CatalogueItem>> {
        let catalogue = self.catalogue().await?;
        Ok(catalogue.get(id).cloned())
    }

    /// Drop the cached copy and fetch again
    pub async fn refresh(&self) -> Result<Arc<Catalogue>> {
        let catalogue = Arc::new(self.source.fetch().await?);
        let mut cached = self.cached.write().await;
        *cached = Some(Cached {
            catalogue: catalogue.clone(),
            fetched_at: Instant::now(),
        });
        Ok(catalogue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    /// Counts fetches and can be switched to fail
    struct CountingSource {
        fetches: AtomicUsize,
        failing: AtomicBool,
    }

    impl CountingSource {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                fetches: AtomicUsize::new(0),
                failing: AtomicBool::new(false),
            })
        }
    }

    #[async_trait]
    impl CatalogueSource for CountingSource {
        async fn fetch(&self) -> Result<Catalogue> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            if self.failing.load(Ordering::SeqCst) {
                return Err(Error::Fetch {
                    location: "test".to_string(),
                    status: 503,
                });
            }
            Catalogue::from_json(
                br#"[{ "id": "x", "name": "X", "organization": { "name": "Org" } }]"#,
            )
        }

        fn describe(&self) -> String {
            "test".to_string()
        }
    }

    #[tokio::test]
    async fn test_fresh_copy_is_reused() {
        let source = CountingSource::new();
        let store = CatalogueStore::new(source.clone(), Duration::from_secs(60));

        store.catalogue().await.unwrap();
        store.catalogue().await.unwrap();
        assert_eq!(source.fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_zero_ttl_fetches_every_time() {
        let source = CountingSource::new();
        let store = CatalogueStore::new(source.clone(), Duration::ZERO);

        store.catalogue().await.unwrap();
        store.catalogue().await.unwrap();
        assert_eq!(source.fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_stale_copy_served_when_refetch_fails() {
        let source = CountingSource::new();
        let store = CatalogueStore::new(source.clone(), Duration::ZERO);

        store.catalogue().await.unwrap();
        source.failing.store(true, Ordering::SeqCst);
        let catalogue = store.catalogue().await.unwrap();
        assert_eq!(catalogue.len(), 1);
    }

    #[tokio::test]
    async fn test_error_without_previous_copy() {
        let source = CountingSource::new();
        source.failing.store(true, Ordering::SeqCst);
        let store = CatalogueStore::new(source, Duration::from_secs(60));

        assert!(store.catalogue().await.is_err());
    }

    #[tokio::test]
    async fn test_fetch_catalogue_item() {
        let store = CatalogueStore::new(CountingSource::new(), Duration::from_secs(60));
        assert_eq!(
            store.fetch_catalogue_item("x").await.unwrap().map(|i| i.name),
            Some("X".to_string())
        );
        assert!(store.fetch_catalogue_item("y").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_refresh_bypasses_cache() {
        let source = CountingSource::new();
        let store = CatalogueStore::new(source.clone(), Duration::from_secs(60));

        store.catalogue().await.unwrap();
        store.refresh().await.unwrap();
        assert_eq!(source.fetches.load(Ordering::SeqCst), 2);
    }
}
