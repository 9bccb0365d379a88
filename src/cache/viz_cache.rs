use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

use crate::graph::Directions;
use crate::viz::VizPayload;

/// Cache key covering every parameter that affects a projected payload.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VizCacheKey {
    pub word: String,
    pub depth: usize,
    pub neighbor_limit: usize,
    pub max_nodes: usize,
    pub outgoing: bool,
    pub incoming: bool,
}

impl VizCacheKey {
    pub fn new(
        word: &str,
        depth: usize,
        neighbor_limit: usize,
        max_nodes: usize,
        directions: &Directions,
    ) -> Self {
        Self {
            word: word.to_string(),
            depth,
            neighbor_limit,
            max_nodes,
            outgoing: directions.outgoing,
            incoming: directions.incoming,
        }
    }
}

/// Thread-safe LRU cache of projected visualization payloads.
///
/// The graph is read-only while the server runs, so a payload for a
/// given parameter tuple never goes stale; LRU eviction keeps the
/// memory bounded.
pub struct VizCache {
    cache: Mutex<LruCache<VizCacheKey, Arc<VizPayload>>>,
}

impl VizCache {
    /// Create a cache with the given capacity (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity.max(1)).expect("cache capacity must be at least 1");
        Self {
            cache: Mutex::new(LruCache::new(cap)),
        }
    }

    pub fn get(&self, key: &VizCacheKey) -> Option<Arc<VizPayload>> {
        self.cache.lock().unwrap().get(key).cloned()
    }

    pub fn put(&self, key: VizCacheKey, payload: Arc<VizPayload>) {
        self.cache.lock().unwrap().put(key, payload);
    }

    pub fn len(&self) -> usize {
        self.cache.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.lock().unwrap().is_empty()
    }

    pub fn clear(&self) {
        self.cache.lock().unwrap().clear();
    }
}
