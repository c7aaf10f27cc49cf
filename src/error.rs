//! Error taxonomy for the data layer.
//!
//! Three response-path classes matter to callers: `Network` (the transport
//! failed; the orchestrator tries the cache fallback before surfacing it),
//! `Shape` (a response arrived but did not match the envelope contract), and
//! `Upstream` (the CMS reported a structured error). Shape and Upstream are
//! never retried automatically; they indicate a request or contract problem,
//! not a transient fault.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DataError {
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("response shape error: {message}")]
    Shape { message: String },
    #[error("upstream error: status {status}: {message}")]
    Upstream { status: u16, message: String },
    #[error("configuration error: {message}")]
    Configuration { message: String },
    #[error("telemetry initialization failed: {0}")]
    Telemetry(String),
}

impl DataError {
    pub fn shape(message: impl Into<String>) -> Self {
        Self::Shape {
            message: message.into(),
        }
    }

    pub fn upstream(status: u16, message: impl Into<String>) -> Self {
        Self::Upstream {
            status,
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn telemetry(message: impl Into<String>) -> Self {
        Self::Telemetry(message.into())
    }

    /// True for transport-level failures, the only class eligible for the
    /// stale-cache fallback.
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_errors_are_not_network_errors() {
        let err = DataError::upstream(503, "Service Unavailable");
        assert!(!err.is_network());
        assert_eq!(
            err.to_string(),
            "upstream error: status 503: Service Unavailable"
        );
    }

    #[test]
    fn shape_helper_carries_message() {
        let err = DataError::shape("expected a collection");
        assert!(matches!(err, DataError::Shape { .. }));
        assert_eq!(err.to_string(), "response shape error: expected a collection");
    }
}
