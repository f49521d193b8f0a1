//! Event sink error types

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum EventError {
    /// `emit` after `close` is a programming error
    #[error("event sink {} is already closed", path.display())]
    UseAfterClose { path: PathBuf },

    #[error("{operation} {} failed: {source}", path.display())]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("payload for '{event_type}' could not be serialized: {source}")]
    Serialize {
        event_type: String,
        #[source]
        source: serde_json::Error,
    },
}

impl crate::core::error_handling::ContextualError for EventError {
    fn is_user_actionable(&self) -> bool {
        false
    }

    fn user_message(&self) -> Option<&str> {
        None
    }
}

pub type EventResult<T> = Result<T, EventError>;
