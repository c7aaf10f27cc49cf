//! Stateful collection handle with out-of-order commit protection.
//!
//! A handle owns the latest [`CollectionState`] for one collection. Loads
//! may overlap; each takes a generation number up front and only commits if
//! no newer load started in the meantime, so a slow response can never
//! overwrite the state a faster, newer request produced. The response cache
//! itself needs no such guard: every fetch writes under its own key.

use std::sync::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::debug;

use crate::cache::lock::{rw_read, rw_write};
use crate::client::{CmsClient, FetchOptions};
use crate::error::DataError;

use super::{CollectionKind, CollectionOptions, CollectionState};

const SOURCE: &str = "collections::handle";

pub struct CollectionHandle<K: CollectionKind> {
    client: CmsClient,
    state: RwLock<CollectionState<K::Item>>,
    generation: AtomicU64,
}

impl<K: CollectionKind> CollectionHandle<K> {
    pub fn new(client: CmsClient) -> Self {
        Self {
            client,
            state: RwLock::new(CollectionState::empty()),
            generation: AtomicU64::new(0),
        }
    }

    /// Snapshot of the latest committed state.
    pub fn state(&self) -> CollectionState<K::Item> {
        rw_read(&self.state, SOURCE, "state").clone()
    }

    /// The latest committed items; empty until a load commits.
    pub fn items(&self) -> Vec<K::Item> {
        rw_read(&self.state, SOURCE, "items").items.clone()
    }

    /// Fetch with the client's default cache policy and commit the result.
    pub async fn load(
        &self,
        filter: &K::Filter,
        options: &CollectionOptions,
    ) -> Result<(), DataError> {
        self.load_with(filter, options, self.client.defaults())
            .await
    }

    /// Force a network fetch; the cache read is bypassed, the store is still
    /// populated on success.
    pub async fn refresh(
        &self,
        filter: &K::Filter,
        options: &CollectionOptions,
    ) -> Result<(), DataError> {
        self.load_with(filter, options, self.client.defaults().bypass_cache())
            .await
    }

    async fn load_with(
        &self,
        filter: &K::Filter,
        options: &CollectionOptions,
        fetch: FetchOptions,
    ) -> Result<(), DataError> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let state = self
            .client
            .fetch_collection_with::<K>(filter, options, fetch)
            .await?;

        if self.generation.load(Ordering::SeqCst) == generation {
            *rw_write(&self.state, SOURCE, "commit") = state;
        } else {
            debug!(
                endpoint = K::ENDPOINT,
                generation, "discarded superseded response"
            );
        }
        Ok(())
    }
}
