//! Transport error types

use std::path::PathBuf;

/// Failures of a single fetch or push
///
/// URLs are carried with their query string removed so presigned
/// credentials never reach the logs.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("unsupported URL '{url}'")]
    InvalidUrl { url: String },

    #[error("{method} {url} returned HTTP {status}")]
    Status {
        method: &'static str,
        url: String,
        status: u16,
    },

    #[error("{method} {url} failed: {source}")]
    Request {
        method: &'static str,
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{operation} {} failed: {source}", path.display())]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{url} is not valid JSON: {source}")]
    Parse {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl TransportError {
    /// True when the body arrived but could not be parsed
    pub fn is_parse(&self) -> bool {
        matches!(self, TransportError::Parse { .. })
    }
}

impl crate::core::error_handling::ContextualError for TransportError {
    fn is_user_actionable(&self) -> bool {
        false
    }

    fn user_message(&self) -> Option<&str> {
        None
    }
}

pub type TransportResult<T> = Result<T, TransportError>;
