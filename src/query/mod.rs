//! Bracket-notation query building for the CMS REST query language.
//!
//! A structured [`CmsQuery`] flattens into string pairs the CMS understands:
//! `{filters: {title: {$eq: "x"}}}` becomes `filters[title][$eq]=x`, arrays
//! pick up numeric indices, and population specs recurse down to a bounded
//! depth. The output map is not URL-encoded; the HTTP layer appends it as
//! query pairs and encodes there.

use std::collections::BTreeMap;

use serde_json::Value;
use vitrine_api_types::{CmsQuery, Populate};

/// Default population depth: lesson → part → loop is the deepest relation
/// chain in this content graph.
pub const DEFAULT_POPULATE_DEPTH: usize = 3;

/// Flatten a structured query into bracket-notation pairs.
///
/// `populate_depth` bounds population recursion; a spec nested beyond the
/// bound collapses to a shallow wildcard instead of expanding further.
pub fn build(query: &CmsQuery, populate_depth: usize) -> BTreeMap<String, String> {
    let mut out = BTreeMap::new();

    if let Some(filters) = &query.filters {
        flatten_value(&mut out, "filters", filters);
    }

    for (index, entry) in query.sort.iter().enumerate() {
        out.insert(format!("sort[{index}]"), entry.clone());
    }

    if let Some(page) = &query.pagination {
        out.insert("pagination[page]".to_string(), page.page.to_string());
        out.insert("pagination[pageSize]".to_string(), page.page_size.to_string());
    }

    for (index, field) in query.fields.iter().enumerate() {
        out.insert(format!("fields[{index}]"), field.clone());
    }

    if let Some(locale) = &query.locale {
        out.insert("locale".to_string(), locale.clone());
    }

    if let Some(populate) = &query.populate {
        flatten_populate(&mut out, "populate", populate, populate_depth);
    }

    out
}

fn flatten_value(out: &mut BTreeMap<String, String>, prefix: &str, value: &Value) {
    match value {
        // Null leaves produce no pair at all, matching the serializer's
        // absent-equals-null rule.
        Value::Null => {}
        Value::Object(map) => {
            for (key, member) in map {
                flatten_value(out, &format!("{prefix}[{key}]"), member);
            }
        }
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                flatten_value(out, &format!("{prefix}[{index}]"), item);
            }
        }
        Value::String(text) => {
            out.insert(prefix.to_string(), text.clone());
        }
        Value::Bool(flag) => {
            out.insert(prefix.to_string(), flag.to_string());
        }
        Value::Number(number) => {
            out.insert(prefix.to_string(), number.to_string());
        }
    }
}

fn flatten_populate(
    out: &mut BTreeMap<String, String>,
    prefix: &str,
    populate: &Populate,
    depth: usize,
) {
    if depth == 0 {
        out.insert(prefix.to_string(), "*".to_string());
        return;
    }

    match populate {
        Populate::All => {
            out.insert(prefix.to_string(), "*".to_string());
        }
        Populate::Relations(names) => {
            for (index, name) in names.iter().enumerate() {
                out.insert(format!("{prefix}[{index}]"), name.clone());
            }
        }
        Populate::Nested(entries) => {
            for (name, spec) in entries {
                match spec {
                    Populate::All => {
                        out.insert(format!("{prefix}[{name}]"), "*".to_string());
                    }
                    deeper => {
                        flatten_populate(
                            out,
                            &format!("{prefix}[{name}][populate]"),
                            deeper,
                            depth - 1,
                        );
                    }
                }
            }
        }
    }
}

/// Predicate-tree constructors and the base/external merge rule.
pub mod filter {
    use serde_json::{Map, Value, json};

    pub fn eq(value: impl Into<Value>) -> Value {
        json!({"$eq": value.into()})
    }

    pub fn is_in<I, T>(values: I) -> Value
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        json!({"$in": values})
    }

    /// Case-insensitive containment, the CMS's search primitive.
    pub fn containsi(term: impl Into<Value>) -> Value {
        json!({"$containsi": term.into()})
    }

    pub fn or(branches: Vec<Value>) -> Value {
        json!({"$or": branches})
    }

    pub fn and(branches: Vec<Value>) -> Value {
        json!({"$and": branches})
    }

    /// One value filters exact, several filter membership, none filters
    /// nothing.
    pub fn term_or_set<T>(values: &[T]) -> Option<Value>
    where
        T: Clone + Into<Value>,
    {
        match values {
            [] => None,
            [single] => Some(eq(single.clone())),
            many => Some(is_in(many.iter().cloned())),
        }
    }

    /// Shallow merge of caller-supplied filters over a base predicate map.
    ///
    /// External entries replace base entries on the same top-level key;
    /// replacing rather than combining keeps a caller override from
    /// accidentally over-constraining a field the base already filters.
    /// A non-object external value is ignored.
    pub fn merge(base: Map<String, Value>, external: Option<&Value>) -> Option<Value> {
        let mut merged = base;
        if let Some(Value::Object(entries)) = external {
            for (key, value) in entries {
                merged.insert(key.clone(), value.clone());
            }
        }
        if merged.is_empty() {
            None
        } else {
            Some(Value::Object(merged))
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{Map, json};
    use vitrine_api_types::PageSelection;

    use super::*;

    fn pairs(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
        entries
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect()
    }

    #[test]
    fn simple_filter_flattens_to_bracket_notation() {
        let query = CmsQuery {
            filters: Some(json!({"title": {"$eq": "Test"}})),
            ..Default::default()
        };
        assert_eq!(
            build(&query, DEFAULT_POPULATE_DEPTH),
            pairs(&[("filters[title][$eq]", "Test")])
        );
    }

    #[test]
    fn sort_entries_are_indexed_in_order() {
        let query = CmsQuery {
            sort: vec!["name:asc".to_string(), "date:desc".to_string()],
            ..Default::default()
        };
        assert_eq!(
            build(&query, DEFAULT_POPULATE_DEPTH),
            pairs(&[("sort[0]", "name:asc"), ("sort[1]", "date:desc")])
        );
    }

    #[test]
    fn nested_populate_matches_wire_format() {
        let query = CmsQuery {
            populate: Some(Populate::nested([
                ("media", Populate::All),
                (
                    "lessons",
                    Populate::Relations(vec!["part".to_string(), "loop".to_string()]),
                ),
            ])),
            ..Default::default()
        };
        assert_eq!(
            build(&query, DEFAULT_POPULATE_DEPTH),
            pairs(&[
                ("populate[media]", "*"),
                ("populate[lessons][populate][0]", "part"),
                ("populate[lessons][populate][1]", "loop"),
            ])
        );
    }

    #[test]
    fn null_leaves_produce_no_pairs() {
        let query = CmsQuery {
            filters: Some(json!({"title": {"$eq": "Test"}, "code": null})),
            ..Default::default()
        };
        assert_eq!(
            build(&query, DEFAULT_POPULATE_DEPTH),
            pairs(&[("filters[title][$eq]", "Test")])
        );
    }

    #[test]
    fn combinators_flatten_with_numeric_indices() {
        let query = CmsQuery {
            filters: Some(json!({
                "$or": [
                    {"title": {"$containsi": "x"}},
                    {"summary": {"$containsi": "x"}}
                ]
            })),
            ..Default::default()
        };
        assert_eq!(
            build(&query, DEFAULT_POPULATE_DEPTH),
            pairs(&[
                ("filters[$or][0][title][$containsi]", "x"),
                ("filters[$or][1][summary][$containsi]", "x"),
            ])
        );
    }

    #[test]
    fn non_string_leaves_are_stringified() {
        let query = CmsQuery {
            filters: Some(json!({"year": {"$eq": 2024}, "featured": {"$eq": true}})),
            ..Default::default()
        };
        assert_eq!(
            build(&query, DEFAULT_POPULATE_DEPTH),
            pairs(&[
                ("filters[year][$eq]", "2024"),
                ("filters[featured][$eq]", "true"),
            ])
        );
    }

    #[test]
    fn pagination_fields_and_locale_flatten() {
        let query = CmsQuery {
            pagination: Some(PageSelection::new(2, 25)),
            fields: vec!["title".to_string(), "code".to_string()],
            locale: Some("fr".to_string()),
            ..Default::default()
        };
        assert_eq!(
            build(&query, DEFAULT_POPULATE_DEPTH),
            pairs(&[
                ("pagination[page]", "2"),
                ("pagination[pageSize]", "25"),
                ("fields[0]", "title"),
                ("fields[1]", "code"),
                ("locale", "fr"),
            ])
        );
    }

    #[test]
    fn wildcard_and_list_populate() {
        let wildcard = CmsQuery {
            populate: Some(Populate::All),
            ..Default::default()
        };
        assert_eq!(
            build(&wildcard, DEFAULT_POPULATE_DEPTH),
            pairs(&[("populate", "*")])
        );

        let listed = CmsQuery {
            populate: Some(Populate::Relations(vec![
                "discipline".to_string(),
                "media".to_string(),
            ])),
            ..Default::default()
        };
        assert_eq!(
            build(&listed, DEFAULT_POPULATE_DEPTH),
            pairs(&[("populate[0]", "discipline"), ("populate[1]", "media")])
        );
    }

    #[test]
    fn populate_beyond_the_depth_bound_collapses_to_wildcard() {
        let spec = Populate::nested([(
            "part",
            Populate::nested([("loop", Populate::nested([("lessons", Populate::All)]))]),
        )]);
        let query = CmsQuery {
            populate: Some(spec),
            ..Default::default()
        };
        // Depth 2: part (1) → loop (2) → lessons would be level 3; the loop
        // spec collapses instead of recursing.
        assert_eq!(
            build(&query, 2),
            pairs(&[("populate[part][populate][loop][populate]", "*")])
        );
    }

    #[test]
    fn term_or_set_picks_eq_then_in() {
        assert_eq!(filter::term_or_set::<String>(&[]), None);
        assert_eq!(
            filter::term_or_set(&["L1".to_string()]),
            Some(json!({"$eq": "L1"}))
        );
        assert_eq!(
            filter::term_or_set(&["L1".to_string(), "L2".to_string()]),
            Some(json!({"$in": ["L1", "L2"]}))
        );
    }

    #[test]
    fn combinator_helpers_wrap_their_branches() {
        assert_eq!(
            filter::or(vec![json!({"a": 1})]),
            json!({"$or": [{"a": 1}]})
        );
        assert_eq!(
            filter::and(vec![json!({"a": 1}), json!({"b": 2})]),
            json!({"$and": [{"a": 1}, {"b": 2}]})
        );
    }

    #[test]
    fn merge_lets_external_win_on_conflicting_keys() {
        let mut base = Map::new();
        base.insert("code".to_string(), json!({"$eq": "L1"}));
        base.insert("title".to_string(), json!({"$containsi": "color"}));

        let external = json!({"code": {"$in": ["L2", "L3"]}});
        let merged = filter::merge(base, Some(&external)).expect("merged filters");

        assert_eq!(
            merged,
            json!({
                "code": {"$in": ["L2", "L3"]},
                "title": {"$containsi": "color"}
            })
        );
    }

    #[test]
    fn merge_of_nothing_is_none() {
        assert_eq!(filter::merge(Map::new(), None), None);
        // Non-object external input is ignored rather than merged.
        assert_eq!(filter::merge(Map::new(), Some(&json!("nope"))), None);
    }
}
