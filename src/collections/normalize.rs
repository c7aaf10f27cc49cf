//! Envelope normalization: `{id, attributes}` wrappers into flat records.
//!
//! Everything here is a pure transformation over an already-fetched payload.
//! Contract deviations are rejected with a [`DataError::Shape`]; required
//! attributes that are missing or mistyped fail the whole normalization
//! rather than producing half-filled records.

use serde::Deserialize;
use serde_json::Value;
use url::Url;
use vitrine_api_types::{Document, DocumentSet, Envelope, Pagination, Relation};

use crate::domain::MediaAsset;
use crate::error::DataError;

/// Read-only inputs normalization needs beyond the payload itself.
pub struct NormalizeContext {
    pub asset_base: Url,
}

/// Split a raw collection payload into its documents and pagination block.
pub fn parse_collection(raw: &Value) -> Result<(Vec<Document>, Option<Pagination>), DataError> {
    let envelope = Envelope::deserialize(raw)
        .map_err(|err| DataError::shape(format!("response envelope mismatch: {err}")))?;
    let pagination = envelope.meta.as_ref().and_then(|meta| meta.pagination);

    match envelope.data {
        Some(DocumentSet::Many(documents)) => Ok((documents, pagination)),
        Some(DocumentSet::One(_)) => Err(DataError::shape(
            "expected a collection, found a single document",
        )),
        None => Err(DataError::shape("expected a collection, found null data")),
    }
}

/// Required string attribute.
pub fn attr_str(document: &Document, name: &str) -> Result<String, DataError> {
    match document.attributes.get(name) {
        Some(Value::String(text)) => Ok(text.clone()),
        Some(_) => Err(DataError::shape(format!(
            "attribute `{name}` on document {} should be a string",
            document.id
        ))),
        None => Err(DataError::shape(format!(
            "attribute `{name}` missing on document {}",
            document.id
        ))),
    }
}

/// Optional string attribute; anything that is not a string reads as absent.
pub fn attr_str_opt(document: &Document, name: &str) -> Option<String> {
    match document.attributes.get(name) {
        Some(Value::String(text)) => Some(text.clone()),
        _ => None,
    }
}

/// Optional integer attribute within `i32` range.
pub fn attr_i32_opt(document: &Document, name: &str) -> Option<i32> {
    document
        .attributes
        .get(name)
        .and_then(Value::as_i64)
        .and_then(|value| i32::try_from(value).ok())
}

/// Optional unsigned integer attribute within `u32` range.
pub fn attr_u32_opt(document: &Document, name: &str) -> Option<u32> {
    document
        .attributes
        .get(name)
        .and_then(Value::as_u64)
        .and_then(|value| u32::try_from(value).ok())
}

/// Resolve a to-one relation. An absent key or `{data: null}` is an empty
/// relation; a list where one record is expected is a contract deviation.
pub fn relation_one(document: &Document, name: &str) -> Result<Option<Document>, DataError> {
    let Some(value) = document.attributes.get(name) else {
        return Ok(None);
    };
    if value.is_null() {
        return Ok(None);
    }

    let relation = Relation::deserialize(value).map_err(|err| {
        DataError::shape(format!(
            "relation `{name}` on document {} is malformed: {err}",
            document.id
        ))
    })?;

    match relation.data {
        None => Ok(None),
        Some(DocumentSet::One(related)) => Ok(Some(related)),
        Some(DocumentSet::Many(_)) => Err(DataError::shape(format!(
            "relation `{name}` on document {} should be to-one",
            document.id
        ))),
    }
}

/// Resolve a to-many relation. Absent and null both read as empty.
pub fn relation_many(document: &Document, name: &str) -> Result<Vec<Document>, DataError> {
    let Some(value) = document.attributes.get(name) else {
        return Ok(Vec::new());
    };
    if value.is_null() {
        return Ok(Vec::new());
    }

    let relation = Relation::deserialize(value).map_err(|err| {
        DataError::shape(format!(
            "relation `{name}` on document {} is malformed: {err}",
            document.id
        ))
    })?;

    match relation.data {
        None => Ok(Vec::new()),
        Some(DocumentSet::Many(related)) => Ok(related),
        Some(DocumentSet::One(_)) => Err(DataError::shape(format!(
            "relation `{name}` on document {} should be to-many",
            document.id
        ))),
    }
}

/// Flatten a to-many media relation into resolved assets.
pub fn media_assets(
    cx: &NormalizeContext,
    document: &Document,
    name: &str,
) -> Result<Vec<MediaAsset>, DataError> {
    relation_many(document, name)?
        .iter()
        .map(|asset| media_asset(cx, asset))
        .collect()
}

/// Flatten a to-one media relation into a resolved asset, if present.
pub fn media_asset_one(
    cx: &NormalizeContext,
    document: &Document,
    name: &str,
) -> Result<Option<MediaAsset>, DataError> {
    relation_one(document, name)?
        .map(|asset| media_asset(cx, &asset))
        .transpose()
}

fn media_asset(cx: &NormalizeContext, document: &Document) -> Result<MediaAsset, DataError> {
    let raw_url = attr_str(document, "url")?;
    Ok(MediaAsset {
        url: resolve_asset_url(cx, &raw_url)?,
        alternative_text: attr_str_opt(document, "alternativeText"),
        width: attr_u32_opt(document, "width"),
        height: attr_u32_opt(document, "height"),
    })
}

/// Absolute URLs pass through; relative paths resolve against the asset base.
pub fn resolve_asset_url(cx: &NormalizeContext, raw: &str) -> Result<String, DataError> {
    if Url::parse(raw).is_ok() {
        return Ok(raw.to_string());
    }
    cx.asset_base
        .join(raw)
        .map(Url::into)
        .map_err(|err| DataError::shape(format!("media URL `{raw}` cannot resolve: {err}")))
}
