use std::{
    collections::HashMap,
    sync::{PoisonError, RwLock},
};

use jiff::Timestamp;
use serde_json::Value;

/// Last successful payload for one query/variables pair.
#[derive(Clone, Debug, PartialEq)]
pub struct CacheEntry {
    pub data: Value,
    pub stored_at: Timestamp,
}

impl CacheEntry {
    pub fn new(data: Value, stored_at: Timestamp) -> Self {
        Self { data, stored_at }
    }

    /// Fresh while strictly less than `ttl_secs` have passed since it was stored.
    pub fn is_fresh(&self, now: Timestamp, ttl_secs: u64) -> bool {
        let age_ms = now.as_millisecond().saturating_sub(self.stored_at.as_millisecond());
        let ttl_ms = i64::try_from(ttl_secs).unwrap_or(i64::MAX).saturating_mul(1_000);
        age_ms < ttl_ms
    }
}

/// Canonical cache key: trimmed query text plus variables serialized with
/// sorted object keys, so equivalent requests share a slot.
pub fn cache_key(query: &str, variables: Option<&Value>) -> String {
    serde_json::json!({ "query": query.trim(), "variables": variables }).to_string()
}

pub trait CacheStore: Send + Sync {
    fn get(&self, key: &str) -> Option<CacheEntry>;
    fn put(&self, key: String, entry: CacheEntry);
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// In-process map. With a capacity, inserting a new key into a full map
/// evicts the entry stored longest ago.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    capacity: Option<usize>,
}

impl MemoryCache {
    /// `0` means unbounded.
    pub fn with_capacity(capacity: usize) -> Self {
        Self { entries: RwLock::default(), capacity: (capacity > 0).then_some(capacity) }
    }
}

impl CacheStore for MemoryCache {
    fn get(&self, key: &str) -> Option<CacheEntry> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).get(key).cloned()
    }

    fn put(&self, key: String, entry: CacheEntry) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);

        if let Some(capacity) = self.capacity {
            if !entries.contains_key(&key) && entries.len() >= capacity {
                let oldest = entries
                    .iter()
                    .min_by_key(|(_, e)| e.stored_at)
                    .map(|(k, _)| k.clone());
                if let Some(oldest) = oldest {
                    tracing::debug!(key = %oldest, "evicting oldest cache entry");
                    entries.remove(&oldest);
                }
            }
        }

        entries.insert(key, entry);
    }

    fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn at(ms: i64) -> Timestamp {
        Timestamp::from_millisecond(ms).unwrap()
    }

    #[test]
    fn key_ignores_surrounding_whitespace_and_variable_order() {
        let a = cache_key("  query A { x }\n", Some(&json!({ "slug": "up", "first": 1 })));
        let b = cache_key("query A { x }", Some(&json!({ "first": 1, "slug": "up" })));
        assert_eq!(a, b);
    }

    #[test]
    fn key_distinguishes_variables() {
        let a = cache_key("query A { x }", Some(&json!({ "slug": "up" })));
        let b = cache_key("query A { x }", Some(&json!({ "slug": "down" })));
        let c = cache_key("query A { x }", None);
        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn freshness_is_strict() {
        let entry = CacheEntry::new(json!(1), at(10_000));
        assert!(entry.is_fresh(at(10_000), 60));
        assert!(entry.is_fresh(at(69_999), 60));
        assert!(!entry.is_fresh(at(70_000), 60));
        assert!(!entry.is_fresh(at(10_000), 0));
    }

    #[test]
    fn put_overwrites_existing_entry() {
        let cache = MemoryCache::default();
        cache.put("k".into(), CacheEntry::new(json!("old"), at(1)));
        cache.put("k".into(), CacheEntry::new(json!("new"), at(2)));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("k").unwrap().data, json!("new"));
    }

    #[test]
    fn bounded_cache_evicts_oldest() {
        let cache = MemoryCache::with_capacity(2);
        cache.put("a".into(), CacheEntry::new(json!("a"), at(1)));
        cache.put("b".into(), CacheEntry::new(json!("b"), at(2)));
        cache.put("a".into(), CacheEntry::new(json!("a2"), at(3)));
        cache.put("c".into(), CacheEntry::new(json!("c"), at(4)));

        assert_eq!(cache.len(), 2);
        assert!(cache.get("b").is_none());
        assert_eq!(cache.get("a").unwrap().data, json!("a2"));
        assert!(cache.get("c").is_some());
    }

    #[test]
    fn zero_capacity_is_unbounded() {
        let cache = MemoryCache::with_capacity(0);
        for i in 0..100 {
            cache.put(format!("k{i}"), CacheEntry::new(json!(i), at(i)));
        }
        assert_eq!(cache.len(), 100);
    }
}
