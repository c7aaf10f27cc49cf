//! Structured description of a CMS collection request.
//!
//! A [`CmsQuery`] is the typed form of everything the CMS accepts as query
//! parameters. The data layer flattens it into bracket-notation pairs
//! (`filters[title][$eq]=...`); these types only describe intent.

use std::collections::BTreeMap;

use serde_json::Value;

/// A complete request description for one collection endpoint.
///
/// `filters` is a predicate tree using the CMS's `$`-prefixed operator keys
/// (`$eq`, `$in`, `$containsi`, `$or`, ...). It stays a [`Value`] on purpose:
/// the operator grammar is open-ended and callers compose trees with the
/// data layer's filter helpers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CmsQuery {
    pub filters: Option<Value>,
    pub pagination: Option<PageSelection>,
    /// Ordered `field:direction` entries; order is meaningful.
    pub sort: Vec<String>,
    pub populate: Option<Populate>,
    /// Field allowlist; empty means "all fields".
    pub fields: Vec<String>,
    pub locale: Option<String>,
}

/// Page-based pagination selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSelection {
    pub page: u32,
    pub page_size: u32,
}

impl PageSelection {
    pub fn new(page: u32, page_size: u32) -> Self {
        Self { page, page_size }
    }
}

/// Which relations to expand in a response, and how deep.
///
/// Expansion recursion is bounded by an explicit depth argument at build
/// time; the CMS relation graph contains cycles (lesson → part → loop →
/// lessons), so unbounded expansion must not be expressible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Populate {
    /// Wildcard: shallow-populate every relation one level.
    All,
    /// Populate exactly these relations, one level.
    Relations(Vec<String>),
    /// Per-relation specs; values are either [`Populate::All`] or a deeper
    /// spec of their own.
    Nested(BTreeMap<String, Populate>),
}

impl Populate {
    /// Convenience constructor for a nested spec.
    pub fn nested<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (&'static str, Populate)>,
    {
        Self::Nested(
            entries
                .into_iter()
                .map(|(name, spec)| (name.to_string(), spec))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_query_is_empty() {
        let query = CmsQuery::default();
        assert!(query.filters.is_none());
        assert!(query.pagination.is_none());
        assert!(query.sort.is_empty());
        assert!(query.populate.is_none());
        assert!(query.fields.is_empty());
        assert!(query.locale.is_none());
    }

    #[test]
    fn nested_constructor_orders_by_relation_name() {
        let populate = Populate::nested([
            ("media", Populate::All),
            ("discipline", Populate::All),
        ]);
        match populate {
            Populate::Nested(entries) => {
                let names: Vec<_> = entries.keys().cloned().collect();
                assert_eq!(names, vec!["discipline", "media"]);
            }
            other => panic!("expected nested spec, got {other:?}"),
        }
    }
}
