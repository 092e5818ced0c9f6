use dashmap::DashMap;
use serde_json::Value;
use std::time::{Duration, Instant};

/// Provider responses keyed by request signature.
pub type ResponseCache = TtlCache<Value>;

/// Last-write-wins key/value store with per-entry expiry.
pub struct TtlCache<V> {
    cache: DashMap<String, CachedEntry<V>>,
    default_ttl: Duration,
}

struct CachedEntry<V> {
    value: V,
    timestamp: Instant,
    ttl: Duration,
}

impl<V: Clone> TtlCache<V> {
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            cache: DashMap::new(),
            default_ttl,
        }
    }

    /// Insert with the store's default TTL
    pub fn insert(&self, key: impl Into<String>, value: V) {
        self.insert_with_ttl(key, value, self.default_ttl);
    }

    pub fn insert_with_ttl(&self, key: impl Into<String>, value: V, ttl: Duration) {
        self.cache.insert(
            key.into(),
            CachedEntry {
                value,
                timestamp: Instant::now(),
                ttl,
            },
        );
    }

    /// Get value if not expired (evict on read)
    pub fn get(&self, key: &str) -> Option<V> {
        self.cache.get(key).and_then(|entry| {
            if entry.timestamp.elapsed() > entry.ttl {
                drop(entry); // Drop the read lock
                // Only evict if still expired; a concurrent insert may have replaced it.
                self.cache
                    .remove_if(key, |_, entry| entry.timestamp.elapsed() > entry.ttl);
                None
            } else {
                Some(entry.value.clone())
            }
        })
    }

    /// Drop every expired entry
    pub fn purge_expired(&self) -> usize {
        let before = self.cache.len();
        self.cache.retain(|_, entry| entry.timestamp.elapsed() <= entry.ttl);
        before.saturating_sub(self.cache.len())
    }

    /// Clear all entries
    pub fn clear(&self) {
        self.cache.clear();
    }

    /// Get cache size
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Check if cache is empty
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

impl<V: Clone> Default for TtlCache<V> {
    fn default() -> Self {
        Self::new(Duration::from_secs(60))
    }
}

/// Cache key for a provider request: path plus params sorted by name.
pub fn request_signature(path: &str, params: &[(&str, String)]) -> String {
    let mut sorted: Vec<&(&str, String)> = params.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0).then_with(|| a.1.cmp(&b.1)));

    let query: Vec<String> = sorted.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
    if query.is_empty() {
        path.to_string()
    } else {
        format!("{}?{}", path, query.join("&"))
    }
}
