use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use super::MaterialResolver;
use crate::core::cache::Cache;

/// Memoizes successful resolutions, keyed by the material as asked.
///
/// No-matches and failures are not cached, so the next request asks again.
/// Entries never expire; a mapping is assumed stable for the process lifetime.
pub struct CachingResolver<R, T: Send + Sync> {
    inner: R,
    cache: Arc<dyn Cache<String, T>>,
}

impl<R, T: Send + Sync> CachingResolver<R, T> {
    pub fn new(inner: R, cache: Arc<dyn Cache<String, T>>) -> Self {
        Self { inner, cache }
    }
}

#[async_trait]
impl<R, T> MaterialResolver<T> for CachingResolver<R, T>
where
    R: MaterialResolver<T>,
    T: Clone + Send + Sync + 'static,
{
    async fn resolve(&self, material: &str) -> Result<Option<T>> {
        let key = material.to_string();
        if let Some(cached) = self.cache.get(&key).await {
            debug!("Cache hit for resolution: {}", material);
            return Ok(Some(cached));
        }
        debug!("Cache miss for resolution: {}", material);

        let resolved = self.inner.resolve(material).await?;
        if let Some(value) = &resolved {
            self.cache.put(key, value.clone(), None).await;
        }
        Ok(resolved)
    }
}
