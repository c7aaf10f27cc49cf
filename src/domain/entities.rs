//! View models: the CMS envelope flattened into plain records.
//!
//! Normalization owns the only construction path; relation wrappers are
//! resolved into scalar fields and media URLs are absolute by the time these
//! exist. Consumers never see `{id, attributes}` or `{data: ...}` shapes.

use serde::Serialize;

/// A resolved media asset with an absolute URL.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MediaAsset {
    pub url: String,
    pub alternative_text: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// One lesson in the curriculum.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Lesson {
    pub id: i64,
    /// Stable curriculum code, e.g. `L12`.
    pub code: String,
    pub title: String,
    pub summary: Option<String>,
    pub discipline: Option<String>,
    /// Code of the part this lesson belongs to.
    pub part: Option<String>,
    /// Code of the loop that part sits in.
    pub loop_code: Option<String>,
    pub media: Vec<MediaAsset>,
}

/// Downloadable or linked teaching material.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resource {
    pub id: i64,
    pub title: String,
    pub kind: Option<String>,
    /// External link, or the resolved file URL when the resource is hosted.
    pub url: Option<String>,
    pub discipline: Option<String>,
}

/// A reference card: short standalone explanation of one concept.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KnowledgeCard {
    pub id: i64,
    pub title: String,
    pub body: Option<String>,
    pub discipline: Option<String>,
    /// Codes of the lessons this card supports.
    pub lesson_codes: Vec<String>,
}

/// A published piece of student work.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentWork {
    pub id: i64,
    pub title: String,
    pub student: Option<String>,
    pub year: Option<i32>,
    pub discipline: Option<String>,
    pub media: Vec<MediaAsset>,
}
