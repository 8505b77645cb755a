use async_trait::async_trait;
use std::time::Duration;

/// Key-value store used for the price and resolution caches.
///
/// Entries written with a `ttl` stop being returned once it elapses;
/// entries without one live for the lifetime of the store.
#[async_trait]
pub trait Cache<K, V>: Send + Sync
where
    K: Send + Sync,
    V: Send + Sync,
{
    async fn get(&self, key: &K) -> Option<V>;

    async fn put(&self, key: K, value: V, ttl: Option<Duration>);

    async fn clear(&self);
}
