//! CMS client: cache-first fetching with stale-while-revalidate.
//!
//! [`CmsClient::fetch_with_cache`] is the single path every collection goes
//! through: derive the key, serve a fresh cached payload when allowed, fetch
//! on miss, fall back to the last known payload when the transport fails, and
//! refresh stale entries in the background without blocking the caller.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use metrics::{counter, histogram};
use serde_json::{Map, Value};
use tokio::sync::Mutex;
use tracing::{debug, warn};
use url::Url;

use vitrine_api_types::ErrorBody;

use crate::cache::{CacheConfig, ResponseStore, query_key, shared_store};
use crate::config::{ApiSettings, Settings};
use crate::error::DataError;

const METRIC_FETCH_MS: &str = "vitrine_fetch_ms";
const METRIC_CACHE_FALLBACK: &str = "vitrine_cache_fallback_total";
const METRIC_CACHE_REVALIDATE: &str = "vitrine_cache_revalidate_total";

/// Per-request cache policy.
#[derive(Debug, Clone, Copy)]
pub struct FetchOptions {
    /// Hard expiry: cached entries older than this are invisible.
    pub cache_time: Duration,
    /// Soft threshold: younger entries are served as-is, older ones are
    /// served and refreshed in the background.
    pub stale_time: Duration,
    /// When false the cache read is skipped entirely, but a successful fetch
    /// still populates the store.
    pub use_cache: bool,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self::from_config(&CacheConfig::default())
    }
}

impl FetchOptions {
    pub fn from_config(config: &CacheConfig) -> Self {
        Self {
            cache_time: config.cache_time(),
            stale_time: config.stale_time(),
            use_cache: config.enabled,
        }
    }

    /// Same windows, but bypass the cache read; used by refresh.
    pub fn bypass_cache(self) -> Self {
        Self {
            use_cache: false,
            ..self
        }
    }
}

struct ClientInner {
    http: reqwest::Client,
    base: Url,
    asset_base: Url,
    locale: Option<String>,
    store: Arc<ResponseStore>,
    in_flight: DashMap<String, Arc<Mutex<()>>>,
    defaults: FetchOptions,
}

/// Handle to the CMS; cheap to clone, all clones share one store and one
/// in-flight table.
#[derive(Clone)]
pub struct CmsClient {
    inner: Arc<ClientInner>,
}

impl CmsClient {
    /// Construct against validated settings, sharing the process-wide store.
    pub fn from_settings(settings: &Settings) -> Result<Self, DataError> {
        let cache = CacheConfig::from(&settings.cache);
        Self::with_store(&settings.api, &cache, shared_store())
    }

    /// Construct with an explicitly injected store; tests and multi-tenant
    /// hosts use this to keep caches separate.
    pub fn with_store(
        api: &ApiSettings,
        cache: &CacheConfig,
        store: Arc<ResponseStore>,
    ) -> Result<Self, DataError> {
        let http = reqwest::Client::builder()
            .user_agent(Self::user_agent())
            .build()?;

        Ok(Self {
            inner: Arc::new(ClientInner {
                http,
                base: api.base_url.clone(),
                asset_base: api.asset_base_url.clone(),
                locale: api.locale.clone(),
                store,
                in_flight: DashMap::new(),
                defaults: FetchOptions::from_config(cache),
            }),
        })
    }

    pub fn user_agent() -> &'static str {
        concat!("vitrine/", env!("CARGO_PKG_VERSION"))
    }

    pub fn asset_base(&self) -> &Url {
        &self.inner.asset_base
    }

    pub fn default_locale(&self) -> Option<&str> {
        self.inner.locale.as_deref()
    }

    pub fn defaults(&self) -> FetchOptions {
        self.inner.defaults
    }

    pub fn store(&self) -> &Arc<ResponseStore> {
        &self.inner.store
    }

    /// Fetch an endpoint through the cache.
    ///
    /// Concurrent misses on the same key coalesce: one caller fetches while
    /// the rest wait and re-read the freshly stored payload.
    pub async fn fetch_with_cache(
        &self,
        endpoint: &str,
        params: &BTreeMap<String, String>,
        options: FetchOptions,
    ) -> Result<Value, DataError> {
        let key = query_key(endpoint, &params_value(params));

        if options.use_cache {
            if let Some(value) = self.inner.store.get(&key, options.cache_time) {
                if self.inner.store.is_stale(&key, options.stale_time) {
                    self.spawn_revalidation(endpoint, params, &key, options);
                }
                debug!(endpoint, "served from cache");
                return Ok(value);
            }
        }

        let gate = self.gate(&key);
        let _permit = gate.lock().await;

        // Another caller may have fetched while we waited at the gate.
        if options.use_cache {
            if let Some(value) = self.inner.store.get(&key, options.cache_time) {
                debug!(endpoint, "served from cache after coalesced fetch");
                return Ok(value);
            }
        }

        let result = self.fetch_raw(endpoint, params).await;
        self.inner.in_flight.remove(&key);

        match result {
            Ok(value) => {
                self.inner.store.set(key, value.clone(), options.cache_time);
                Ok(value)
            }
            Err(err) if err.is_network() => match self.inner.store.get_any(&key) {
                Some(stale) => {
                    counter!(METRIC_CACHE_FALLBACK).increment(1);
                    warn!(endpoint, error = %err, "network fetch failed, serving stale cached response");
                    Ok(stale)
                }
                None => Err(err),
            },
            Err(err) => Err(err),
        }
    }

    /// One GET against the CMS, with the error taxonomy applied.
    pub async fn fetch_raw(
        &self,
        endpoint: &str,
        params: &BTreeMap<String, String>,
    ) -> Result<Value, DataError> {
        let url = self.endpoint_url(endpoint, params)?;
        let started = Instant::now();

        let response = self.inner.http.get(url).send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        histogram!(METRIC_FETCH_MS).record(started.elapsed().as_secs_f64() * 1000.0);

        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorBody>(&bytes)
                .map(|body| body.error.message)
                .unwrap_or_else(|_| String::from_utf8_lossy(&bytes).into_owned());
            return Err(DataError::upstream(status.as_u16(), message));
        }

        serde_json::from_slice(&bytes)
            .map_err(|err| DataError::shape(format!("response body is not valid JSON: {err}")))
    }

    fn endpoint_url(
        &self,
        endpoint: &str,
        params: &BTreeMap<String, String>,
    ) -> Result<Url, DataError> {
        let mut url = self.inner.base.join(endpoint)?;
        if !params.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in params {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    fn gate(&self, key: &str) -> Arc<Mutex<()>> {
        let entry = self
            .inner
            .in_flight
            .entry(key.to_string())
            .or_default();
        Arc::clone(entry.value())
    }

    /// Refresh a stale entry without blocking the caller that hit it.
    ///
    /// The task's failure never surfaces: a stale payload keeps being served
    /// until some later fetch succeeds.
    fn spawn_revalidation(
        &self,
        endpoint: &str,
        params: &BTreeMap<String, String>,
        key: &str,
        options: FetchOptions,
    ) {
        let client = self.clone();
        let endpoint = endpoint.to_string();
        let params = params.clone();
        let key = key.to_string();

        counter!(METRIC_CACHE_REVALIDATE).increment(1);

        tokio::spawn(async move {
            let gate = client.gate(&key);
            let _permit = gate.lock().await;

            // A coalesced fetch may already have refreshed the entry.
            if !client.inner.store.is_stale(&key, options.stale_time) {
                client.inner.in_flight.remove(&key);
                return;
            }

            let result = client.fetch_raw(&endpoint, &params).await;
            client.inner.in_flight.remove(&key);

            match result {
                Ok(value) => {
                    client.inner.store.set(key, value, options.cache_time);
                }
                Err(err) => {
                    warn!(endpoint, error = %err, "background revalidation failed");
                }
            }
        });
    }
}

fn params_value(params: &BTreeMap<String, String>) -> Value {
    let map: Map<String, Value> = params
        .iter()
        .map(|(key, value)| (key.clone(), Value::String(value.clone())))
        .collect();
    Value::Object(map)
}
