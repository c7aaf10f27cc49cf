//! Knowledge cards: short standalone concept explanations.

use serde_json::{Map, Value, json};
use vitrine_api_types::{Document, Populate};

use crate::domain::KnowledgeCard;
use crate::error::DataError;
use crate::query::filter;

use super::normalize::{self, NormalizeContext};
use super::{CollectionHandle, CollectionKind};

#[derive(Debug, Clone, Default)]
pub struct KnowledgeCardFilter {
    pub disciplines: Vec<String>,
    pub search: Option<String>,
}

pub struct KnowledgeCards;

pub type KnowledgeCardsHandle = CollectionHandle<KnowledgeCards>;

impl CollectionKind for KnowledgeCards {
    type Item = KnowledgeCard;
    type Filter = KnowledgeCardFilter;

    const ENDPOINT: &'static str = "knowledge-cards";

    fn base_filters(filter: &KnowledgeCardFilter) -> Map<String, Value> {
        let mut filters = Map::new();
        if let Some(predicate) = filter::term_or_set(&filter.disciplines) {
            filters.insert("discipline".to_string(), json!({"slug": predicate}));
        }
        if let Some(term) = &filter.search {
            // Cards are searched on both title and body.
            filters.insert(
                "$or".to_string(),
                json!([
                    {"title": filter::containsi(term.clone())},
                    {"body": filter::containsi(term.clone())}
                ]),
            );
        }
        filters
    }

    fn populate() -> Populate {
        Populate::nested([("discipline", Populate::All), ("lessons", Populate::All)])
    }

    fn normalize(_cx: &NormalizeContext, document: &Document) -> Result<KnowledgeCard, DataError> {
        let lesson_codes = normalize::relation_many(document, "lessons")?
            .iter()
            .filter_map(|related| normalize::attr_str_opt(related, "code"))
            .collect();

        Ok(KnowledgeCard {
            id: document.id,
            title: normalize::attr_str(document, "title")?,
            body: normalize::attr_str_opt(document, "body"),
            discipline: normalize::relation_one(document, "discipline")?
                .and_then(|related| normalize::attr_str_opt(&related, "name")),
            lesson_codes,
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
    fn search_spans_title_and_body() {
        let filter = KnowledgeCardFilter {
            search: Some("kerning".to_string()),
            ..Default::default()
        };
        let filters = KnowledgeCards::base_filters(&filter);
        assert_eq!(
            filters.get("$or"),
            Some(&json!([
                {"title": {"$containsi": "kerning"}},
                {"body": {"$containsi": "kerning"}}
            ]))
        );
    }

    #[test]
    fn normalize_collects_lesson_codes() {
        let document = serde_json::from_value(json!({
            "id": 21,
            "attributes": {
                "title": "Kerning",
                "body": "Adjusting space between letter pairs.",
                "lessons": {"data": [
                    {"id": 1, "attributes": {"code": "L3"}},
                    {"id": 2, "attributes": {"code": "L7"}}
                ]}
            }
        }))
        .expect("document fixture");

        let card = KnowledgeCards::normalize(&cx(), &document).expect("card normalizes");
        assert_eq!(card.lesson_codes, vec!["L3", "L7"]);
        assert_eq!(card.discipline, None);
    }
}
