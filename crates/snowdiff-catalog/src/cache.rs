//! Query result caching with TTL
//!
//! Identical catalog queries repeat many times inside one interactive
//! session; the cache keeps their results for a bounded window to avoid
//! redundant warehouse round-trips. Keyed by query text. This is a
//! performance optimization only, never a correctness requirement.

use snowdiff_core::QueryOutput;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
struct CacheEntry {
    output: Arc<QueryOutput>,
    created_at: Instant,
    ttl: Duration,
}

impl CacheEntry {
    fn is_valid(&self) -> bool {
        self.created_at.elapsed() < self.ttl
    }
}

/// Query result cache with TTL support
///
/// Expired entries are evicted on access.
pub struct QueryCache {
    cache: Arc<RwLock<HashMap<String, CacheEntry>>>,
    default_ttl: Duration,
}

impl QueryCache {
    /// Create a cache with the given TTL for every entry
    pub fn new(ttl: Duration) -> Self {
        Self {
            cache: Arc::new(RwLock::new(HashMap::new())),
            default_ttl: ttl,
        }
    }

    /// Insert a query result, keyed by its query text
    pub fn insert(&self, sql: &str, output: QueryOutput) {
        let entry = CacheEntry {
            output: Arc::new(output),
            created_at: Instant::now(),
            ttl: self.default_ttl,
        };

        if let Ok(mut cache) = self.cache.write() {
            cache.insert(sql.to_string(), entry);
        }
    }

    /// Get a cached result if present and not expired
    pub fn get(&self, sql: &str) -> Option<Arc<QueryOutput>> {
        if let Ok(cache) = self.cache.read() {
            if let Some(entry) = cache.get(sql) {
                if entry.is_valid() {
                    return Some(Arc::clone(&entry.output));
                }
            }
        }

        // Entry doesn't exist or is expired
        self.evict(sql);
        None
    }

    /// Remove one entry
    pub fn evict(&self, sql: &str) {
        if let Ok(mut cache) = self.cache.write() {
            cache.remove(sql);
        }
    }

    /// Remove every entry
    pub fn clear(&self) {
        if let Ok(mut cache) = self.cache.write() {
            cache.clear();
        }
    }

    /// Number of entries, including expired ones not yet evicted
    pub fn len(&self) -> usize {
        self.cache.read().map(|c| c.len()).unwrap_or(0)
    }

    /// True when the cache holds no entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for QueryCache {
    /// Cache with the default TTL of 10 minutes
    fn default() -> Self {
        Self::new(Duration::from_secs(600))
    }
}
