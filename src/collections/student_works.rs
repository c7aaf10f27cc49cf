//! Student works: the showcase collection.

use serde_json::{Map, Value, json};
use vitrine_api_types::{Document, Populate};

use crate::domain::StudentWork;
use crate::error::DataError;
use crate::query::filter;

use super::normalize::{self, NormalizeContext};
use super::{CollectionHandle, CollectionKind};

#[derive(Debug, Clone, Default)]
pub struct StudentWorkFilter {
    pub disciplines: Vec<String>,
    /// Graduation years.
    pub years: Vec<i32>,
    pub search: Option<String>,
}

pub struct StudentWorks;

pub type StudentWorksHandle = CollectionHandle<StudentWorks>;

impl CollectionKind for StudentWorks {
    type Item = StudentWork;
    type Filter = StudentWorkFilter;

    const ENDPOINT: &'static str = "student-works";

    fn base_filters(filter: &StudentWorkFilter) -> Map<String, Value> {
        let mut filters = Map::new();
        if let Some(predicate) = filter::term_or_set(&filter.years) {
            filters.insert("year".to_string(), predicate);
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
        Populate::nested([("discipline", Populate::All), ("media", Populate::All)])
    }

    fn normalize(cx: &NormalizeContext, document: &Document) -> Result<StudentWork, DataError> {
        Ok(StudentWork {
            id: document.id,
            title: normalize::attr_str(document, "title")?,
            student: normalize::attr_str_opt(document, "student"),
            year: normalize::attr_i32_opt(document, "year"),
            discipline: normalize::relation_one(document, "discipline")?
                .and_then(|related| normalize::attr_str_opt(&related, "name")),
            media: normalize::media_assets(cx, document, "media")?,
        })
    }
}
