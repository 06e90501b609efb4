//! Caching layer for recently fetched blocks
//!
//! Blocks are keyed by hash only. A height can point at a different block
//! after a reorganization, so height lookups are resolved to a hash first.
use crate::types::{BlockRecord, Hash256};
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Bounded, recency-ordered block cache.
///
/// Every access goes through one mutex: a hit promotes the entry, so even
/// `get` mutates the recency order.
pub struct BlockCache {
    cache: Arc<Mutex<LruCache<Hash256, BlockRecord>>>,
}

impl BlockCache {
    pub const DEFAULT_CAPACITY: usize = 100;

    /// Create a cache holding at most `capacity` blocks. Zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        let capacity_nz = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: Arc::new(Mutex::new(LruCache::new(capacity_nz))),
        }
    }

    /// Look up a block and mark it most recently used.
    pub async fn get(&self, hash: &Hash256) -> Option<BlockRecord> {
        let mut cache = self.cache.lock().await;
        let hit = cache.get(hash).cloned();
        tracing::debug!(%hash, hit = hit.is_some(), "block cache lookup");
        hit
    }

    /// Insert or replace a block, evicting the least recently used entry
    /// when the cache is full.
    pub async fn put(&self, hash: Hash256, block: BlockRecord) {
        let mut cache = self.cache.lock().await;
        if let Some((evicted, _)) = cache.push(hash, block) {
            if evicted != hash {
                tracing::debug!(%evicted, "evicted block from cache");
            }
        }
    }

    /// Check membership without touching the recency order.
    pub async fn contains(&self, hash: &Hash256) -> bool {
        let cache = self.cache.lock().await;
        cache.contains(hash)
    }

    pub async fn len(&self) -> usize {
        let cache = self.cache.lock().await;
        cache.len()
    }

    pub async fn is_empty(&self) -> bool {
        let cache = self.cache.lock().await;
        cache.is_empty()
    }

    pub async fn capacity(&self) -> usize {
        let cache = self.cache.lock().await;
        cache.cap().get()
    }

    /// (entries, capacity)
    pub async fn stats(&self) -> (usize, usize) {
        let cache = self.cache.lock().await;
        (cache.len(), cache.cap().get())
    }
}

impl Default for BlockCache {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

impl Clone for BlockCache {
    fn clone(&self) -> Self {
        Self {
            cache: Arc::clone(&self.cache),
        }
    }
}
