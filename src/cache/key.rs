//! Cache key derivation.
//!
//! A key is the endpoint identifier joined with the canonical serialization
//! of the request parameters. The literal composition keeps keys readable in
//! logs, and distinct parameter sets can never collide because the
//! serialization is injective for acyclic JSON.

use serde_json::Value;

use crate::serialize::stable_string;

/// Derive the cache key for one request.
///
/// Pure: identical endpoint and logically identical parameters always
/// produce the same key, regardless of how the parameter object was built.
pub fn query_key(endpoint: &str, params: &Value) -> String {
    format!("{endpoint}?{}", stable_string(params))
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use serde_json::json;

    use super::*;

    #[test]
    fn key_is_insertion_order_independent() {
        let first = query_key(
            "lessons",
            &json!({"filters": {"code": {"$eq": "L1"}}, "sort": ["title:asc"]}),
        );
        let second = query_key(
            "lessons",
            &json!({"sort": ["title:asc"], "filters": {"code": {"$eq": "L1"}}}),
        );
        assert_eq!(first, second);
    }

    #[test]
    fn endpoint_is_part_of_the_key() {
        let params = json!({"locale": "en"});
        assert_ne!(query_key("lessons", &params), query_key("resources", &params));
    }

    #[test]
    fn key_embeds_canonical_params() {
        let key = query_key("lessons", &json!({"b": 1, "a": 2}));
        assert_eq!(key, r#"lessons?{"a":2,"b":1}"#);
    }

    #[test]
    fn distinct_filter_combinations_never_collide() {
        // UI-scale cardinality: every combination must map to its own key.
        let disciplines = ["graphics", "product", "textile", "motion", "type", "photo", "space", "web", "craft", "print"];
        let mut keys = HashSet::new();
        let mut count = 0usize;

        for discipline in disciplines {
            for loop_index in 0..10 {
                for page in 1..=10 {
                    for page_size in [10, 20, 25, 30, 40, 50, 60, 75, 90, 100] {
                        let params = json!({
                            "filters": {
                                "discipline": {"slug": {"$eq": discipline}},
                                "part": {"loop": {"code": {"$eq": format!("B{loop_index}")}}}
                            },
                            "pagination": {"page": page, "pageSize": page_size}
                        });
                        keys.insert(query_key("lessons", &params));
                        count += 1;
                    }
                }
            }
        }

        assert_eq!(count, 10_000);
        assert_eq!(keys.len(), count, "every distinct parameter set needs its own key");
    }
}
