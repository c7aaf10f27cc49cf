//! Response store: raw CMS payloads with freshness accounting.
//!
//! Entries are replaced wholesale, never mutated in place. Expired entries
//! are not deleted eagerly; they stay reachable through [`ResponseStore::get_any`]
//! so a network failure can fall back to the last known payload, and are only
//! removed by explicit invalidation, `clear_all`, or LRU pressure.

use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use lru::LruCache;
use metrics::counter;
use once_cell::sync::Lazy;
use serde_json::Value;
use tracing::debug;

use super::config::CacheConfig;
use super::lock::{rw_read, rw_write};

const SOURCE: &str = "cache::store";

const METRIC_CACHE_HIT: &str = "vitrine_cache_hit_total";
const METRIC_CACHE_MISS: &str = "vitrine_cache_miss_total";
const METRIC_CACHE_EVICT: &str = "vitrine_cache_evict_total";

/// One cached response.
#[derive(Debug, Clone)]
pub struct StoredResponse {
    pub value: Value,
    pub stored_at: Instant,
    pub ttl: Duration,
}

impl StoredResponse {
    fn age(&self) -> Duration {
        self.stored_at.elapsed()
    }

    /// Usable under the hard cutoff: younger than both the caller's window
    /// and the entry's own ttl.
    fn is_usable(&self, max_age: Duration) -> bool {
        let age = self.age();
        age <= self.ttl && age <= max_age
    }
}

/// LRU-bounded store of raw responses shared by every collection.
///
/// The bound is deliberate: this store lives for the whole client process,
/// not a single page session, so growth must stay capped. Capacity pressure
/// evicts least-recently-used entries and increments
/// `vitrine_cache_evict_total`.
pub struct ResponseStore {
    entries: RwLock<LruCache<String, StoredResponse>>,
}

impl ResponseStore {
    /// Create a new store with the given configuration.
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            entries: RwLock::new(LruCache::new(config.max_entries_non_zero())),
        }
    }

    /// Return the stored value if the entry is younger than both `max_age`
    /// and its own ttl. Expired entries stay in place; deletion is lazy.
    pub fn get(&self, key: &str, max_age: Duration) -> Option<Value> {
        let mut entries = rw_write(&self.entries, SOURCE, "get");
        match entries.get(key) {
            Some(entry) if entry.is_usable(max_age) => {
                counter!(METRIC_CACHE_HIT).increment(1);
                Some(entry.value.clone())
            }
            _ => {
                counter!(METRIC_CACHE_MISS).increment(1);
                None
            }
        }
    }

    /// Return the stored value regardless of age.
    ///
    /// This is the degraded-success read: when the network is down, the last
    /// known payload beats an error, even past its hard expiry.
    pub fn get_any(&self, key: &str) -> Option<Value> {
        rw_write(&self.entries, SOURCE, "get_any")
            .get(key)
            .map(|entry| entry.value.clone())
    }

    /// Store or overwrite unconditionally.
    pub fn set(&self, key: impl Into<String>, value: Value, ttl: Duration) {
        let key = key.into();
        let entry = StoredResponse {
            value,
            stored_at: Instant::now(),
            ttl,
        };
        let evicted = rw_write(&self.entries, SOURCE, "set").push(key.clone(), entry);
        if let Some((evicted_key, _)) = evicted {
            if evicted_key != key {
                counter!(METRIC_CACHE_EVICT).increment(1);
                debug!(key = %evicted_key, "evicted response at capacity");
            }
        }
    }

    /// True when no entry exists or the entry is older than `stale_after`.
    ///
    /// Independent of the hard cutoff in [`ResponseStore::get`]: an entry can
    /// be stale (worth revalidating in the background) while still usable.
    pub fn is_stale(&self, key: &str, stale_after: Duration) -> bool {
        let entries = rw_read(&self.entries, SOURCE, "is_stale");
        match entries.peek(key) {
            Some(entry) => entry.age() > stale_after,
            None => true,
        }
    }

    /// Remove one entry.
    pub fn invalidate(&self, key: &str) {
        rw_write(&self.entries, SOURCE, "invalidate").pop(key);
    }

    /// Remove every entry; used on logout and test teardown.
    pub fn clear_all(&self) {
        rw_write(&self.entries, SOURCE, "clear_all").clear();
    }

    /// Get the number of stored responses.
    pub fn len(&self) -> usize {
        rw_read(&self.entries, SOURCE, "len").len()
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[cfg(test)]
    pub(crate) fn backdate(&self, key: &str, by: Duration) {
        let mut entries = rw_write(&self.entries, SOURCE, "backdate");
        if let Some(entry) = entries.get_mut(key) {
            if let Some(earlier) = entry.stored_at.checked_sub(by) {
                entry.stored_at = earlier;
            }
        }
    }
}

static SHARED_STORE: Lazy<Arc<ResponseStore>> =
    Lazy::new(|| Arc::new(ResponseStore::new(&CacheConfig::default())));

/// Process-wide default store.
///
/// The store has an explicit constructor and is injected everywhere; this
/// default instance exists so applications that want one shared cache do not
/// have to thread it through by hand. Tests should construct their own.
pub fn shared_store() -> Arc<ResponseStore> {
    Arc::clone(&SHARED_STORE)
}
