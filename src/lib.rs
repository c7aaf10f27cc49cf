//! Vitrine data layer.
//!
//! Client-side data layer for the Vitrine content platform: the CMS exposes
//! collections of lessons, resources, knowledge cards and student works over
//! a REST query language; this crate turns typed requests into that wire
//! format, caches raw responses in-process, and flattens the CMS envelope
//! into plain domain records.
//!
//! The pipeline, leaf-first:
//!
//! - [`serialize`] — canonical strings for cache-key material
//! - [`cache`] — key derivation plus the LRU-bounded response store
//! - [`query`] — structured queries flattened into bracket notation
//! - [`client`] — cache-first fetching with stale-while-revalidate
//! - [`collections`] — per-entity descriptors, normalization, and stateful
//!   handles with out-of-order protection
//!
//! ```no_run
//! use vitrine::collections::{CollectionOptions, LessonFilter, Lessons};
//! use vitrine::{CmsClient, config};
//!
//! # async fn demo() -> Result<(), vitrine::DataError> {
//! let settings = config::load().expect("configuration loads");
//! let client = CmsClient::from_settings(&settings)?;
//!
//! let lessons = client
//!     .fetch_collection::<Lessons>(
//!         &LessonFilter {
//!             disciplines: vec!["graphics".into()],
//!             ..Default::default()
//!         },
//!         &CollectionOptions::default(),
//!     )
//!     .await?;
//!
//! for lesson in &lessons.items {
//!     println!("{} {}", lesson.code, lesson.title);
//! }
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod client;
pub mod collections;
pub mod config;
pub mod domain;
pub mod error;
pub mod query;
pub mod serialize;
pub mod telemetry;

pub use cache::{CacheConfig, ResponseStore, query_key, shared_store};
pub use client::{CmsClient, FetchOptions};
pub use collections::{CollectionHandle, CollectionOptions, CollectionState};
pub use error::DataError;
pub use serialize::stable_string;
