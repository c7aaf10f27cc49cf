//! Lessons: the curriculum's primary collection.

use serde_json::{Map, Value, json};
use vitrine_api_types::{Document, Populate};

use crate::domain::Lesson;
use crate::error::DataError;
use crate::query::filter;

use super::normalize::{self, NormalizeContext};
use super::{CollectionHandle, CollectionKind};

/// Typed filter fields for lesson queries.
///
/// Each field follows the one-is-exact rule: a single value filters with
/// `$eq`, several with `$in`, none leaves the field unfiltered.
#[derive(Debug, Clone, Default)]
pub struct LessonFilter {
    /// Discipline slugs, matched through the discipline relation.
    pub disciplines: Vec<String>,
    /// Loop codes, reached through the part relation.
    pub loops: Vec<String>,
    /// Lesson codes.
    pub codes: Vec<String>,
    /// Case-insensitive title search.
    pub search: Option<String>,
}

pub struct Lessons;

pub type LessonsHandle = CollectionHandle<Lessons>;

impl CollectionKind for Lessons {
    type Item = Lesson;
    type Filter = LessonFilter;

    const ENDPOINT: &'static str = "lessons";

    fn base_filters(filter: &LessonFilter) -> Map<String, Value> {
        let mut filters = Map::new();
        if let Some(predicate) = filter::term_or_set(&filter.codes) {
            filters.insert("code".to_string(), predicate);
        }
        if let Some(predicate) = filter::term_or_set(&filter.disciplines) {
            filters.insert("discipline".to_string(), json!({"slug": predicate}));
        }
        if let Some(predicate) = filter::term_or_set(&filter.loops) {
            filters.insert("part".to_string(), json!({"loop": {"code": predicate}}));
        }
        if let Some(term) = &filter.search {
            filters.insert("title".to_string(), filter::containsi(term.clone()));
        }
        filters
    }

    fn populate() -> Populate {
        Populate::nested([
            ("discipline", Populate::All),
            ("media", Populate::All),
            ("part", Populate::nested([("loop", Populate::All)])),
        ])
    }

    fn normalize(cx: &NormalizeContext, document: &Document) -> Result<Lesson, DataError> {
        let discipline = normalize::relation_one(document, "discipline")?
            .and_then(|related| normalize::attr_str_opt(&related, "name"));

        let (part, loop_code) = match normalize::relation_one(document, "part")? {
            Some(part_document) => {
                let loop_document = normalize::relation_one(&part_document, "loop")?;
                (
                    normalize::attr_str_opt(&part_document, "code"),
                    loop_document.and_then(|related| normalize::attr_str_opt(&related, "code")),
                )
            }
            None => (None, None),
        };

        Ok(Lesson {
            id: document.id,
            code: normalize::attr_str(document, "code")?,
            title: normalize::attr_str(document, "title")?,
            summary: normalize::attr_str_opt(document, "summary"),
            discipline,
            part,
            loop_code,
            media: normalize::media_assets(cx, document, "media")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use url::Url;

    use super::*;

    fn cx() -> NormalizeContext {
        NormalizeContext {
            asset_base: Url::parse("http://localhost:1337/").expect("asset base"),
        }
    }

    #[test]
    fn single_code_filters_exact() {
        let filter = LessonFilter {
            codes: vec!["L1".to_string()],
            ..Default::default()
        };
        let filters = Lessons::base_filters(&filter);
        assert_eq!(filters.get("code"), Some(&json!({"$eq": "L1"})));
    }

    #[test]
    fn several_codes_filter_membership() {
        let filter = LessonFilter {
            codes: vec!["L1".to_string(), "L2".to_string()],
            ..Default::default()
        };
        let filters = Lessons::base_filters(&filter);
        assert_eq!(filters.get("code"), Some(&json!({"$in": ["L1", "L2"]})));
    }

    #[test]
    fn relation_fields_filter_through_their_paths() {
        let filter = LessonFilter {
            disciplines: vec!["graphics".to_string()],
            loops: vec!["B2".to_string()],
            ..Default::default()
        };
        let filters = Lessons::base_filters(&filter);
        assert_eq!(
            filters.get("discipline"),
            Some(&json!({"slug": {"$eq": "graphics"}}))
        );
        assert_eq!(
            filters.get("part"),
            Some(&json!({"loop": {"code": {"$eq": "B2"}}}))
        );
    }

    #[test]
    fn search_filters_titles_case_insensitively() {
        let filter = LessonFilter {
            search: Some("color".to_string()),
            ..Default::default()
        };
        let filters = Lessons::base_filters(&filter);
        assert_eq!(
            filters.get("title"),
            Some(&json!({"$containsi": "color"}))
        );
    }

    #[test]
    fn normalize_flattens_the_relation_chain() {
        let document = serde_json::from_value(json!({
            "id": 7,
            "attributes": {
                "code": "L12",
                "title": "Color systems",
                "summary": "Mixing and matching.",
                "discipline": {"data": {"id": 1, "attributes": {"name": "Graphics", "slug": "graphics"}}},
                "part": {"data": {"id": 3, "attributes": {
                    "code": "P2",
                    "loop": {"data": {"id": 9, "attributes": {"code": "B1"}}}
                }}},
                "media": {"data": [{"id": 40, "attributes": {"url": "/uploads/wheel.png"}}]}
            }
        }))
        .expect("document fixture");

        let lesson = Lessons::normalize(&cx(), &document).expect("lesson normalizes");
        assert_eq!(lesson.id, 7);
        assert_eq!(lesson.code, "L12");
        assert_eq!(lesson.title, "Color systems");
        assert_eq!(lesson.discipline.as_deref(), Some("Graphics"));
        assert_eq!(lesson.part.as_deref(), Some("P2"));
        assert_eq!(lesson.loop_code.as_deref(), Some("B1"));
        assert_eq!(lesson.media[0].url, "http://localhost:1337/uploads/wheel.png");
    }

    #[test]
    fn normalize_tolerates_unpopulated_relations() {
        let document = serde_json::from_value(json!({
            "id": 8,
            "attributes": {"code": "L13", "title": "Grids"}
        }))
        .expect("document fixture");

        let lesson = Lessons::normalize(&cx(), &document).expect("lesson normalizes");
        assert_eq!(lesson.discipline, None);
        assert_eq!(lesson.part, None);
        assert_eq!(lesson.loop_code, None);
        assert!(lesson.media.is_empty());
    }

    #[test]
    fn normalize_requires_code_and_title() {
        let document = serde_json::from_value(json!({
            "id": 9,
            "attributes": {"title": "No code"}
        }))
        .expect("document fixture");

        let err = Lessons::normalize(&cx(), &document).expect_err("missing code rejected");
        assert!(matches!(err, DataError::Shape { .. }));
    }
}
