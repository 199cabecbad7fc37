//! In-memory TTL cache using DashMap

use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Concurrent key/value cache whose entries expire.
///
/// Expired entries are dropped on read and by a background sweep, so the
/// cache must be created inside a Tokio runtime.
pub struct MemoryCache<V> {
    data: Arc<DashMap<String, CacheEntry<V>>>,
}

struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

impl<V: Clone + Send + Sync + 'static> MemoryCache<V> {
    pub fn new() -> Self {
        Self::with_sweep_interval(Duration::from_secs(60))
    }

    pub fn with_sweep_interval(interval: Duration) -> Self {
        let cache = Self {
            data: Arc::new(DashMap::new()),
        };
        cache.start_cleanup_task(interval);
        cache
    }

    pub fn get(&self, key: &str) -> Option<V> {
        let entry = self.data.get(key)?;
        if Instant::now() >= entry.expires_at {
            drop(entry);
            self.data.remove(key);
            return None;
        }
        Some(entry.value.clone())
    }

    pub fn insert(&self, key: impl Into<String>, value: V, ttl: Duration) {
        self.data.insert(
            key.into(),
            CacheEntry {
                value,
                expires_at: Instant::now() + ttl,
            },
        );
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    fn start_cleanup_task(&self, interval: Duration) {
        let data = Arc::downgrade(&self.data);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                // Stop once the cache itself is gone.
                let Some(data) = data.upgrade() else {
                    break;
                };
                let now = Instant::now();
                data.retain(|_, entry| entry.expires_at > now);
            }
        });
    }
}

impl<V: Clone + Send + Sync + 'static> Default for MemoryCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_basic_operations() {
        let cache = MemoryCache::new();

        cache.insert("key1", vec![1, 2, 3], Duration::from_secs(60));
        assert_eq!(cache.get("key1"), Some(vec![1, 2, 3]));
        assert_eq!(cache.get("nonexistent"), None);

        cache.insert("key1", vec![4], Duration::from_secs(60));
        assert_eq!(cache.get("key1"), Some(vec![4]));
    }

    #[tokio::test]
    async fn test_ttl() {
        let cache = MemoryCache::new();

        cache.insert("key1", "v".to_string(), Duration::from_millis(10));
        assert_eq!(cache.get("key1").as_deref(), Some("v"));

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(cache.get("key1"), None);
    }

    #[tokio::test]
    async fn test_sweep_drops_expired_entries() {
        let cache = MemoryCache::with_sweep_interval(Duration::from_millis(5));
        cache.insert("short", 1u8, Duration::from_millis(1));
        cache.insert("long", 2u8, Duration::from_secs(60));

        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("long"), Some(2));
    }
}
