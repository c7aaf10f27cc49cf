//! Vitrine response cache.
//!
//! A process-wide store of raw CMS responses keyed by endpoint plus the
//! canonical serialization of the request parameters:
//!
//! - **Key** — `lessons?{"filters":{...},"sort":[...]}`; identical logical
//!   parameters always map to the same entry.
//! - **Store** — LRU-bounded map of key → (value, stored-at, ttl) with a hard
//!   usability cutoff (`get`), a softer revalidation signal (`is_stale`), and
//!   an expiry-ignoring read (`get_any`) for the degraded-success fallback.
//!
//! ## Configuration
//!
//! Cache behavior is controlled via `vitrine.toml`:
//!
//! ```toml
//! [cache]
//! enabled = true
//! cache_time_ms = 300000
//! stale_time_ms = 60000
//! max_entries = 2048
//! ```

mod config;
mod key;
pub(crate) mod lock;
mod store;

pub use config::CacheConfig;
pub use key::query_key;
pub use store::{ResponseStore, StoredResponse, shared_store};
