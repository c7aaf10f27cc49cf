//! Cache configuration.
//!
//! Controls the response store and the orchestrator's freshness windows via
//! `vitrine.toml`.

use std::num::NonZeroUsize;
use std::time::Duration;

use serde::Deserialize;

// Default values for cache configuration
pub(crate) const DEFAULT_CACHE_TIME_MS: u64 = 5 * 60 * 1000;
pub(crate) const DEFAULT_STALE_TIME_MS: u64 = 60 * 1000;
pub(crate) const DEFAULT_MAX_ENTRIES: usize = 2048;

/// Cache configuration from `vitrine.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Serve cached responses at all; when false every fetch goes to the
    /// network but successful responses are still stored.
    pub enabled: bool,
    /// Hard usability window (ms): older entries are invisible to `get`.
    pub cache_time_ms: u64,
    /// Soft revalidation window (ms): older entries are served but trigger a
    /// background refresh.
    pub stale_time_ms: u64,
    /// Maximum entries in the response store before LRU eviction.
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            cache_time_ms: DEFAULT_CACHE_TIME_MS,
            stale_time_ms: DEFAULT_STALE_TIME_MS,
            max_entries: DEFAULT_MAX_ENTRIES,
        }
    }
}

impl From<&crate::config::CacheSettings> for CacheConfig {
    fn from(settings: &crate::config::CacheSettings) -> Self {
        Self {
            enabled: settings.enabled,
            cache_time_ms: settings.cache_time_ms,
            stale_time_ms: settings.stale_time_ms,
            max_entries: settings.max_entries,
        }
    }
}

impl CacheConfig {
    pub fn cache_time(&self) -> Duration {
        Duration::from_millis(self.cache_time_ms)
    }

    pub fn stale_time(&self) -> Duration {
        Duration::from_millis(self.stale_time_ms)
    }

    /// Returns the entry limit as NonZeroUsize, clamping to 1 if zero.
    pub fn max_entries_non_zero(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.max_entries).unwrap_or(NonZeroUsize::MIN)
    }
}
