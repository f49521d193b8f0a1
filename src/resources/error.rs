//! Resource error types

use crate::transport::TransportError;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ResourceError {
    /// Downloaded bytes do not hash to the declared checksum
    #[error("sha256 mismatch for resource {name}: expected {expected}, got {actual}")]
    Integrity {
        name: String,
        expected: String,
        actual: String,
    },

    #[error("download of resource {name} failed: {source}")]
    Download {
        name: String,
        #[source]
        source: TransportError,
    },

    #[error("{operation} {} failed: {source}", path.display())]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("extracting {} failed: {message}", path.display())]
    Extract { path: PathBuf, message: String },
}

impl crate::core::error_handling::ContextualError for ResourceError {
    fn is_user_actionable(&self) -> bool {
        false
    }

    fn user_message(&self) -> Option<&str> {
        None
    }
}

pub type ResourceResult<T> = Result<T, ResourceError>;
