//! Collection family: typed access to the CMS's content collections.
//!
//! Every entity goes through the same pipeline — typed filter fields become a
//! predicate tree, caller-supplied raw filters shallow-merge over it
//! (external wins per top-level key), the query builder flattens the result,
//! the client fetches through the cache, and a normalizer flattens the
//! envelope into domain records. The per-entity code is exactly the parts
//! that differ: endpoint, base-filter builder, population spec, normalizer.

mod handle;
mod knowledge_cards;
mod lessons;
pub mod normalize;
mod resources;
mod student_works;

use serde_json::{Map, Value};
use time::OffsetDateTime;
use vitrine_api_types::{CmsQuery, Document, PageSelection, Pagination, Populate};

use crate::client::{CmsClient, FetchOptions};
use crate::error::DataError;
use crate::query::{self, DEFAULT_POPULATE_DEPTH, filter};

pub use handle::CollectionHandle;
pub use knowledge_cards::{KnowledgeCardFilter, KnowledgeCards, KnowledgeCardsHandle};
pub use lessons::{LessonFilter, Lessons, LessonsHandle};
pub use normalize::NormalizeContext;
pub use resources::{ResourceFilter, Resources, ResourcesHandle};
pub use student_works::{StudentWorkFilter, StudentWorks, StudentWorksHandle};

const DEFAULT_PAGE_SIZE: u32 = 25;

/// One content collection: the endpoint, how typed filter fields become
/// predicates, what to populate, and how a document flattens into an item.
pub trait CollectionKind {
    type Item: Clone + Send + Sync + 'static;
    type Filter: Default + Clone + Send + Sync;

    const ENDPOINT: &'static str;

    fn base_filters(filter: &Self::Filter) -> Map<String, Value>;
    fn populate() -> Populate;
    fn normalize(cx: &NormalizeContext, document: &Document) -> Result<Self::Item, DataError>;
}

/// Entity-independent request knobs.
#[derive(Debug, Clone, Default)]
pub struct CollectionOptions {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    /// Ordered `field:direction` entries.
    pub sort: Vec<String>,
    /// Overrides the client's default locale for this request.
    pub locale: Option<String>,
    /// Raw predicate tree merged over the entity's base filters; entries here
    /// replace base entries on the same top-level key.
    pub filters: Option<Value>,
}

/// The latest normalized view of one collection.
///
/// Replaced wholesale whenever a fetch completes; `cache_timestamp` is when
/// that normalization ran, not when the payload entered the response cache.
#[derive(Debug, Clone)]
pub struct CollectionState<T> {
    pub items: Vec<T>,
    pub meta: Option<Pagination>,
    pub cache_timestamp: OffsetDateTime,
}

impl<T> CollectionState<T> {
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            meta: None,
            cache_timestamp: OffsetDateTime::UNIX_EPOCH,
        }
    }
}

impl<T> Default for CollectionState<T> {
    fn default() -> Self {
        Self::empty()
    }
}

fn collection_query<K: CollectionKind>(
    default_locale: Option<&str>,
    filter: &K::Filter,
    options: &CollectionOptions,
) -> CmsQuery {
    let filters = filter::merge(K::base_filters(filter), options.filters.as_ref());

    let pagination = match (options.page, options.page_size) {
        (None, None) => None,
        (page, page_size) => Some(PageSelection::new(
            page.unwrap_or(1),
            page_size.unwrap_or(DEFAULT_PAGE_SIZE),
        )),
    };

    CmsQuery {
        filters,
        pagination,
        sort: options.sort.clone(),
        populate: Some(K::populate()),
        fields: Vec::new(),
        locale: options
            .locale
            .clone()
            .or_else(|| default_locale.map(str::to_string)),
    }
}

impl CmsClient {
    /// Fetch one collection with the client's default cache policy.
    pub async fn fetch_collection<K: CollectionKind>(
        &self,
        filter: &K::Filter,
        options: &CollectionOptions,
    ) -> Result<CollectionState<K::Item>, DataError> {
        self.fetch_collection_with::<K>(filter, options, self.defaults())
            .await
    }

    /// Fetch one collection with an explicit cache policy.
    pub async fn fetch_collection_with<K: CollectionKind>(
        &self,
        filter: &K::Filter,
        options: &CollectionOptions,
        fetch: FetchOptions,
    ) -> Result<CollectionState<K::Item>, DataError> {
        let cms_query = collection_query::<K>(self.default_locale(), filter, options);
        let params = query::build(&cms_query, DEFAULT_POPULATE_DEPTH);

        let raw = self.fetch_with_cache(K::ENDPOINT, &params, fetch).await?;

        let (documents, meta) = normalize::parse_collection(&raw)?;
        let cx = NormalizeContext {
            asset_base: self.asset_base().clone(),
        };
        let items = documents
            .iter()
            .map(|document| K::normalize(&cx, document))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(CollectionState {
            items,
            meta,
            cache_timestamp: OffsetDateTime::now_utc(),
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn typed_fields_become_base_filters() {
        let filter = LessonFilter {
            codes: vec!["L1".to_string(), "L2".to_string()],
            ..Default::default()
        };
        let cms_query = collection_query::<Lessons>(None, &filter, &CollectionOptions::default());
        assert_eq!(
            cms_query.filters,
            Some(json!({"code": {"$in": ["L1", "L2"]}}))
        );
    }

    #[test]
    fn external_filters_replace_base_entries() {
        let filter = LessonFilter {
            codes: vec!["L1".to_string()],
            ..Default::default()
        };
        let options = CollectionOptions {
            filters: Some(json!({"code": {"$containsi": "L"}})),
            ..Default::default()
        };
        let cms_query = collection_query::<Lessons>(None, &filter, &options);
        assert_eq!(
            cms_query.filters,
            Some(json!({"code": {"$containsi": "L"}}))
        );
    }

    #[test]
    fn page_selection_defaults_missing_halves() {
        let options = CollectionOptions {
            page: Some(3),
            ..Default::default()
        };
        let cms_query =
            collection_query::<Lessons>(None, &LessonFilter::default(), &options);
        assert_eq!(cms_query.pagination, Some(PageSelection::new(3, 25)));

        let unpaged =
            collection_query::<Lessons>(None, &LessonFilter::default(), &CollectionOptions::default());
        assert_eq!(unpaged.pagination, None);
    }

    #[test]
    fn request_locale_wins_over_client_default() {
        let options = CollectionOptions {
            locale: Some("fr".to_string()),
            ..Default::default()
        };
        let cms_query = collection_query::<Lessons>(Some("en"), &LessonFilter::default(), &options);
        assert_eq!(cms_query.locale.as_deref(), Some("fr"));

        let fallback = collection_query::<Lessons>(
            Some("en"),
            &LessonFilter::default(),
            &CollectionOptions::default(),
        );
        assert_eq!(fallback.locale.as_deref(), Some("en"));
    }

    #[test]
    fn empty_state_has_no_items_and_no_meta() {
        let state: CollectionState<crate::domain::Lesson> = CollectionState::empty();
        assert!(state.items.is_empty());
        assert!(state.meta.is_none());
        assert_eq!(state.cache_timestamp, OffsetDateTime::UNIX_EPOCH);
    }
}
