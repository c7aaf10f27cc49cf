//! Shared wire types for the Vitrine content API.
//!
//! The CMS wraps every record in an `{id, attributes}` envelope and every
//! relation inside `attributes` in a `{data: ...}` wrapper. This crate
//! describes that envelope, the pagination metadata that rides along with
//! collection responses, and the structured query description the data layer
//! flattens into the CMS's bracket-notation query language.
//!
//! Everything here is plain data: no I/O, no caching, no URL handling. Both
//! frontend applications and the `vitrine` data layer depend on these types,
//! so behavior lives elsewhere.

pub mod envelope;
pub mod query;

pub use envelope::{Document, DocumentSet, Envelope, ErrorBody, ErrorDetail, Pagination, Relation, ResponseMeta};
pub use query::{CmsQuery, PageSelection, Populate};
