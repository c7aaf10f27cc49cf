//! Resources: linked or hosted teaching material.

use serde_json::{Map, Value, json};
use vitrine_api_types::{Document, Populate};

use crate::domain::Resource;
use crate::error::DataError;
use crate::query::filter;

use super::normalize::{self, NormalizeContext};
use super::{CollectionHandle, CollectionKind};

#[derive(Debug, Clone, Default)]
pub struct ResourceFilter {
    pub disciplines: Vec<String>,
    /// Resource kinds, e.g. `worksheet`, `slides`, `video`.
    pub kinds: Vec<String>,
    pub search: Option<String>,
}

pub struct Resources;

pub type ResourcesHandle = CollectionHandle<Resources>;

impl CollectionKind for Resources {
    type Item = Resource;
    type Filter = ResourceFilter;

    const ENDPOINT: &'static str = "resources";

    fn base_filters(filter: &ResourceFilter) -> Map<String, Value> {
        let mut filters = Map::new();
        if let Some(predicate) = filter::term_or_set(&filter.kinds) {
            filters.insert("kind".to_string(), predicate);
        }
        if let Some(predicate) = filter::term_or_set(&filter.disciplines) {
            filters.insert("discipline".to_string(), json!({"slug": predicate}));
        }
        if let Some(term) = &filter.search {
            filters.insert("title".to_string(), filter::containsi(term.clone()));
        }
        filters
    }

    fn populate() -> Populate {
        Populate::nested([("discipline", Populate::All), ("file", Populate::All)])
    }

    fn normalize(cx: &NormalizeContext, document: &Document) -> Result<Resource, DataError> {
        // External link wins; hosted resources fall back to their file URL.
        let url = match normalize::attr_str_opt(document, "url") {
            Some(external) => Some(external),
            None => normalize::media_asset_one(cx, document, "file")?.map(|asset| asset.url),
        };

        Ok(Resource {
            id: document.id,
            title: normalize::attr_str(document, "title")?,
            kind: normalize::attr_str_opt(document, "kind"),
            url,
            discipline: normalize::relation_one(document, "discipline")?
                .and_then(|related| normalize::attr_str_opt(&related, "name")),
        })
    }
}
