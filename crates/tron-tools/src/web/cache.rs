//! LRU + TTL cache for web fetch results.
//!
//! Stores fetch results keyed by URL + prompt hash. Entries expire after a
//! configurable TTL (default 15 minutes). LRU eviction when capacity is reached.

use std::collections::HashMap;
use std::time::{Duration, Instant};

const DEFAULT_TTL_SECS: u64 = 15 * 60;
const DEFAULT_MAX_ENTRIES: usize = 100;

/// Configuration for the web cache.
pub struct WebCacheConfig {
    /// TTL for cache entries.
    pub ttl: Duration,
    /// Maximum number of cached entries.
    pub max_entries: usize,
}

impl Default for WebCacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(DEFAULT_TTL_SECS),
            max_entries: DEFAULT_MAX_ENTRIES,
        }
    }
}

/// A cached fetch result.
#[derive(Clone, Debug)]
pub struct CachedResult {
    /// The summarized answer.
    pub answer: String,
    /// Source URL.
    pub url: String,
    /// Page title.
    pub title: String,
    /// Subagent session ID.
    pub subagent_session_id: String,
}

struct CacheEntry {
    result: CachedResult,
    expires_at: Instant,
}

/// LRU + TTL cache for web fetch results.
pub struct WebCache {
    entries: HashMap<String, CacheEntry>,
    access_order: Vec<String>,
    config: WebCacheConfig,
    hits: u64,
    misses: u64,
}

impl WebCache {
    /// Create a new cache with the given configuration.
    pub fn new(config: WebCacheConfig) -> Self {
        Self {
            entries: HashMap::new(),
            access_order: Vec::new(),
            config,
            hits: 0,
            misses: 0,
        }
    }

    /// Get a cached result, updating LRU order. Returns `None` on miss or expiry.
    pub fn get(&mut self, url: &str, prompt: &str) -> Option<&CachedResult> {
        let key = cache_key(url, prompt);

        // Check expiry first
        if let Some(entry) = self.entries.get(&key) {
            if Instant::now() >= entry.expires_at {
                drop(self.entries.remove(&key));
                self.access_order.retain(|k| k != &key);
                self.misses += 1;
                return None;
            }
        } else {
            self.misses += 1;
            return None;
        }

        // Update LRU order
        self.access_order.retain(|k| k != &key);
        self.access_order.push(key.clone());
        self.hits += 1;

        self.entries.get(&key).map(|e| &e.result)
    }

    /// Store a result in the cache. Evicts if at capacity.
    pub fn set(&mut self, url: &str, prompt: &str, result: CachedResult) {
        let key = cache_key(url, prompt);

        // If already exists, remove from access order
        self.access_order.retain(|k| k != &key);

        // Evict if at capacity
        while self.entries.len() >= self.config.max_entries {
            self.evict_oldest();
        }

        let entry = CacheEntry {
            result,
            expires_at: Instant::now() + self.config.ttl,
        };
        drop(self.entries.insert(key.clone(), entry));
        self.access_order.push(key);
    }

    /// Check if a result exists (non-destructive, checks TTL).
    pub fn has(&self, url: &str, prompt: &str) -> bool {
        let key = cache_key(url, prompt);
        self.entries
            .get(&key)
            .is_some_and(|e| Instant::now() < e.expires_at)
    }

    /// Remove all entries and reset stats.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.access_order.clear();
        self.hits = 0;
        self.misses = 0;
    }

    /// Remove expired entries.
    pub fn cleanup(&mut self) {
        let now = Instant::now();
        let expired_keys: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, e)| now >= e.expires_at)
            .map(|(k, _)| k.clone())
            .collect();
        for key in &expired_keys {
            drop(self.entries.remove(key));
            self.access_order.retain(|k| k != key);
        }
    }

    /// Get cache statistics.
    pub fn stats(&self) -> CacheStats {
        let total = self.hits + self.misses;
        CacheStats {
            size: self.entries.len(),
            hits: self.hits,
            misses: self.misses,
            #[allow(clippy::cast_precision_loss)]
            hit_rate: if total == 0 {
                0.0
            } else {
                self.hits as f64 / total as f64
            },
        }
    }

    fn evict_oldest(&mut self) {
        // Prefer expired entries over LRU
        let now = Instant::now();
        let expired_key = self
            .entries
            .iter()
            .find(|(_, e)| now >= e.expires_at)
            .map(|(k, _)| k.clone());

        if let Some(key) = expired_key {
            drop(self.entries.remove(&key));
            self.access_order.retain(|k| k != &key);
            return;
        }

        // Otherwise evict LRU
        if let Some(oldest) = self.access_order.first().cloned() {
            drop(self.entries.remove(&oldest));
            drop(self.access_order.remove(0));
        }
    }
}

/// Cache statistics.
pub struct CacheStats {
    /// Number of entries in the cache.
    pub size: usize,
    /// Number of cache hits.
    pub hits: u64,
    /// Number of cache misses.
    pub misses: u64,
    /// Hit rate (0.0 to 1.0).
    pub hit_rate: f64,
}

/// Generate a cache key from URL + prompt using djb2 hash.
fn cache_key(url: &str, prompt: &str) -> String {
    let combined = format!("{url}::{prompt}");
    let hash = djb2_hash(&combined);
    format!("{url}::{hash}")
}

fn djb2_hash(s: &str) -> u32 {
    let mut hash: u32 = 5381;
    for byte in s.bytes() {
        hash = hash.wrapping_mul(33).wrapping_add(u32::from(byte));
    }
    hash
}
