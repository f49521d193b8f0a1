//! Process supervisor error types

#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("failed to start '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{program}' has no {stream} pipe")]
    Pipe {
        program: String,
        stream: &'static str,
    },

    #[error("reading {stream} of '{program}' failed: {source}")]
    Read {
        program: String,
        stream: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("waiting for '{program}' failed: {source}")]
    Wait {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

impl crate::core::error_handling::ContextualError for ProcessError {
    fn is_user_actionable(&self) -> bool {
        matches!(self, ProcessError::Spawn { .. })
    }

    fn user_message(&self) -> Option<&str> {
        None
    }
}

pub type ProcessResult<T> = Result<T, ProcessError>;
