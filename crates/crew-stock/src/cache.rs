//! Caching layer for descriptor lookups

use async_trait::async_trait;
use cached::{Cached, TimedCache};
use crew_core::{Descriptor, DescriptorProvider, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::debug;

/// Wraps a provider so repeated lookups within the TTL hit memory
///
/// Only successful lookups are cached; a failed lookup is retried on the
/// next call.
pub struct CachedDescriptorProvider {
    inner: Arc<dyn DescriptorProvider>,
    cache: Arc<RwLock<TimedCache<String, Descriptor>>>,
}

impl CachedDescriptorProvider {
    pub fn new(inner: Arc<dyn DescriptorProvider>, ttl: Duration) -> Self {
        Self {
            inner,
            cache: Arc::new(RwLock::new(TimedCache::with_lifespan(ttl))),
        }
    }

    /// Drop every cached descriptor
    pub async fn clear(&self) {
        self.cache.write().await.cache_clear();
    }

    pub async fn len(&self) -> usize {
        self.cache.read().await.cache_size()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl DescriptorProvider for CachedDescriptorProvider {
    async fn lookup(&self, ticker: &str) -> Result<Descriptor> {
        let key = ticker.to_ascii_uppercase();
        if let Some(hit) = self.cache.write().await.cache_get(&key).cloned() {
            debug!(%ticker, "Descriptor cache hit");
            return Ok(hit);
        }

        debug!(%ticker, provider = %self.inner.name(), "Descriptor cache miss");
        let descriptor = self.inner.lookup(ticker).await?;
        let _ = self.cache.write().await.cache_set(key, descriptor.clone());
        Ok(descriptor)
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
