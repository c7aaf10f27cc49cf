//! The CMS response envelope.
//!
//! Collection responses look like:
//!
//! ```json
//! {
//!   "data": [{"id": 7, "attributes": {"title": "...", "discipline": {"data": {...}}}}],
//!   "meta": {"pagination": {"page": 1, "pageSize": 25, "pageCount": 3, "total": 61}}
//! }
//! ```
//!
//! Single-record responses carry one wrapper (or `null`) under `data`.
//! A missing `data` key deserializes the same as an explicit `null`; callers
//! that require a collection reject both.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One CMS record: numeric id plus its attribute map.
///
/// Relation fields inside `attributes` are themselves [`Relation`] wrappers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: i64,
    pub attributes: Map<String, Value>,
}

/// The payload under a `data` key: one record or a list of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DocumentSet {
    Many(Vec<Document>),
    One(Document),
}

impl DocumentSet {
    /// Flatten into a vector regardless of cardinality.
    pub fn into_vec(self) -> Vec<Document> {
        match self {
            DocumentSet::Many(documents) => documents,
            DocumentSet::One(document) => vec![document],
        }
    }

    pub fn len(&self) -> usize {
        match self {
            DocumentSet::Many(documents) => documents.len(),
            DocumentSet::One(_) => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Top-level response envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub data: Option<DocumentSet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<ResponseMeta>,
}

/// A relation wrapper as it appears inside `attributes`.
///
/// Same shape as [`Envelope`] without the metadata; `{"data": null}` marks an
/// empty to-one relation, `{"data": []}` an empty to-many relation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relation {
    pub data: Option<DocumentSet>,
}

/// Response metadata; only pagination is specified today.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

/// Page-based pagination block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub page_size: u32,
    pub page_count: u32,
    pub total: u64,
}

/// Structured error payload the CMS attaches to 4xx/5xx responses.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ErrorDetail {
    pub status: u16,
    pub name: String,
    pub message: String,
}
