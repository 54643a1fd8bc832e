//! TTL response cache for upstream calls.
//!
//! One entry per (endpoint path, sorted query parameters). Entries are
//! evicted lazily: an expired entry is removed on the next lookup of the
//! same key, never swept by a background task. The cache is constructed
//! once at startup and handed to the client explicitly so tests can
//! exercise expiry without a real upstream.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use serde_json::Value;
use tokio::sync::RwLock;

/// A cached upstream payload with its expiry instant.
#[derive(Debug, Clone)]
struct CacheEntry {
    payload: Value,
    expires_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Shared response cache, guarded for the multi-threaded axum runtime.
///
/// The lock covers the whole read-check-write sequence so concurrent
/// requests for the same key cannot both miss and race duplicate upstream
/// calls into the map.
#[derive(Debug, Default)]
pub struct ResponseCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

/// Build a deterministic cache key from an endpoint path and its query
/// parameters. Parameters are sorted so `a=1&b=2` and `b=2&a=1` share an
/// entry.
pub fn cache_key(path: &str, params: &[(&str, String)]) -> String {
    let mut sorted: Vec<&(&str, String)> = params.iter().collect();
    sorted.sort();

    let mut key = String::from(path);
    for (i, (name, value)) in sorted.iter().enumerate() {
        key.push(if i == 0 { '?' } else { '&' });
        key.push_str(name);
        key.push('=');
        key.push_str(value);
    }
    key
}

impl ResponseCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the live payload for `key`, or `None`.
    ///
    /// An expired entry under this key is removed before returning.
    pub async fn lookup(&self, key: &str) -> Option<Value> {
        let now = Instant::now();
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some(entry) if !entry.is_expired(now) => return Some(entry.payload.clone()),
                Some(_) => {}
                None => return None,
            }
        }

        // Expired — re-check under the write lock before evicting, another
        // task may have refreshed the entry in the meantime.
        let mut entries = self.entries.write().await;
        match entries.get(key) {
            Some(entry) if !entry.is_expired(now) => Some(entry.payload.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Store a payload under `key` for `ttl`. A zero TTL is a no-op — the
    /// endpoint class is uncacheable.
    pub async fn store(&self, key: String, payload: Value, ttl: Duration) {
        if ttl.is_zero() {
            return;
        }
        let entry = CacheEntry {
            payload,
            expires_at: Instant::now() + ttl,
        };
        self.entries.write().await.insert(key, entry);
    }

    /// Number of entries currently held, expired or not.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn cache_key_sorts_parameters() {
        let a = cache_key(
            "/vessels/zone",
            &[("minlat", "36.0".into()), ("maxlat", "41.0".into())],
        );
        let b = cache_key(
            "/vessels/zone",
            &[("maxlat", "41.0".into()), ("minlat", "36.0".into())],
        );
        assert_eq!(a, b);
        assert_eq!(a, "/vessels/zone?maxlat=41.0&minlat=36.0");
    }

    #[test]
    fn cache_key_without_params_is_the_path() {
        assert_eq!(cache_key("/ports/search", &[]), "/ports/search");
    }

    #[tokio::test]
    async fn store_and_lookup_round_trip() {
        let cache = ResponseCache::new();
        cache
            .store("k".into(), json!({"mmsi": 366982330}), Duration::from_secs(60))
            .await;
        assert_eq!(cache.lookup("k").await, Some(json!({"mmsi": 366982330})));
    }

    #[tokio::test]
    async fn zero_ttl_is_never_stored() {
        let cache = ResponseCache::new();
        cache.store("k".into(), json!(1), Duration::ZERO).await;
        assert!(cache.lookup("k").await.is_none());
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn expired_entry_is_evicted_on_lookup() {
        let cache = ResponseCache::new();
        cache
            .store("k".into(), json!(1), Duration::from_nanos(1))
            .await;
        tokio::time::sleep(Duration::from_millis(5)).await;
        assert!(cache.lookup("k").await.is_none());
        // Lazy eviction removed the entry, not just hid it.
        assert_eq!(cache.len().await, 0);
    }

    #[tokio::test]
    async fn unexpired_entry_survives_lookup() {
        let cache = ResponseCache::new();
        cache
            .store("k".into(), json!(1), Duration::from_secs(60))
            .await;
        assert!(cache.lookup("k").await.is_some());
        assert_eq!(cache.len().await, 1);
    }
}
