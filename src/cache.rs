//! Caching layer for ferro-wcs operations
//!
//! Simplification walks and rewrites whole mapping trees; applications
//! that repeatedly simplify the same compound chains (a frameset
//! re-routing through common sub-paths, say) can front it with this LRU
//! cache. Keys are the canonical native encoding of the mapping, so two
//! structurally identical chains share an entry regardless of how they
//! were built.
//!
//! # Example
//!
//! ```
//! use ferro_wcs::cache::SimplifyCache;
//! use ferro_wcs::mapping::Mapping;
//!
//! let cache = SimplifyCache::new(100);
//! let chain = Mapping::series(&Mapping::zoom(2, 2.0), &Mapping::zoom(2, 0.5)).unwrap();
//! let simple = cache.get_or_simplify(&chain).unwrap();
//! assert_eq!(simple.kind_class(), "UnitMap");
//! assert_eq!(cache.stats().misses, 1);
//! ```

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use crate::channel::Channel;
use crate::mapping::Mapping;
use crate::Result;

/// Statistics for cache usage
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    /// Number of cache hits
    pub hits: u64,
    /// Number of cache misses
    pub misses: u64,
    /// Number of items currently in cache
    pub size: usize,
    /// Maximum cache capacity
    pub capacity: usize,
    /// Number of evictions
    pub evictions: u64,
}

struct Inner {
    map: HashMap<String, Mapping>,
    order: VecDeque<String>,
}

/// LRU cache of simplified mappings
pub struct SimplifyCache {
    capacity: usize,
    inner: RwLock<Inner>,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl SimplifyCache {
    /// Create a cache holding up to `capacity` simplified mappings
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            inner: RwLock::new(Inner {
                map: HashMap::new(),
                order: VecDeque::new(),
            }),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    /// Simplify through the cache
    pub fn get_or_simplify(&self, mapping: &Mapping) -> Result<Mapping> {
        let key = Channel::native().encode(&mapping.clone().into())?;
        {
            let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
            if let Some(found) = inner.map.get(&key) {
                self.hits.fetch_add(1, Ordering::Relaxed);
                return Ok(found.clone());
            }
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        let simplified = mapping.simplify();

        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
        if !inner.map.contains_key(&key) {
            while inner.map.len() >= self.capacity {
                if let Some(oldest) = inner.order.pop_front() {
                    inner.map.remove(&oldest);
                    self.evictions.fetch_add(1, Ordering::Relaxed);
                } else {
                    break;
                }
            }
            inner.map.insert(key.clone(), simplified.clone());
            inner.order.push_back(key);
        }
        Ok(simplified)
    }

    /// Current usage statistics
    pub fn stats(&self) -> CacheStats {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            size: inner.map.len(),
            capacity: self.capacity,
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }

    /// Drop every cached entry, keeping the statistics
    pub fn clear(&self) {
        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
        inner.map.clear();
        inner.order.clear();
    }
}
