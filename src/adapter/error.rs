//! Collaborator error types

use crate::events::EventError;
use crate::process::ProcessError;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum AdapterError {
    /// Tool-specific code rejected its input
    #[error("{tool}: {message}")]
    Collaborator { tool: String, message: String },

    #[error("parameter '{name}' {message}")]
    InvalidParameter { name: String, message: String },

    #[error("event '{event_type}' could not be built: {source}")]
    Payload {
        event_type: String,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Emit(#[from] EventError),

    #[error(transparent)]
    Process(#[from] ProcessError),

    #[error("{operation} {} failed: {source}", path.display())]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl AdapterError {
    pub fn collaborator(tool: &str, message: impl Into<String>) -> Self {
        Self::Collaborator {
            tool: tool.to_string(),
            message: message.into(),
        }
    }

    pub fn invalid_parameter(name: &str, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.to_string(),
            message: message.into(),
        }
    }
}

impl crate::core::error_handling::ContextualError for AdapterError {
    fn is_user_actionable(&self) -> bool {
        matches!(self, AdapterError::InvalidParameter { .. })
    }

    fn user_message(&self) -> Option<&str> {
        None
    }
}

pub type AdapterResult<T> = Result<T, AdapterError>;
