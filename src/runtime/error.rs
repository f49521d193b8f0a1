//! Run-level errors and the exit-code contract

use crate::adapter::AdapterError;
use crate::config::ConfigError;
use crate::core::error_handling::ContextualError;
use crate::events::EventError;
use crate::process::ProcessError;
use crate::resources::ResourceError;
use crate::transport::TransportError;
use std::path::PathBuf;
use strum_macros::Display;

/// How a failure is classified for reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ErrorCategory {
    Config,
    Transport,
    Integrity,
    Parse,
    Collaborator,
    Io,
    Aborted,
}

#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("loading inputs failed: {0}")]
    Inputs(#[source] TransportError),

    #[error(transparent)]
    Resource(#[from] ResourceError),

    #[error(transparent)]
    Events(#[from] EventError),

    #[error(transparent)]
    Adapter(#[from] AdapterError),

    #[error(transparent)]
    Process(#[from] ProcessError),

    #[error("uploading events failed: {0}")]
    Upload(#[source] TransportError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("working directory {}: {source}", path.display())]
    WorkDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("run aborted by termination request")]
    Aborted,
}

impl RuntimeError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            RuntimeError::Config(_) => ErrorCategory::Config,
            RuntimeError::Inputs(e) | RuntimeError::Upload(e) | RuntimeError::Transport(e) => {
                if e.is_parse() {
                    ErrorCategory::Parse
                } else {
                    ErrorCategory::Transport
                }
            }
            RuntimeError::Resource(ResourceError::Integrity { .. }) => ErrorCategory::Integrity,
            RuntimeError::Resource(ResourceError::Download { .. }) => ErrorCategory::Transport,
            RuntimeError::Resource(_) | RuntimeError::Events(_) | RuntimeError::WorkDir { .. } => {
                ErrorCategory::Io
            }
            RuntimeError::Adapter(_) | RuntimeError::Process(_) => ErrorCategory::Collaborator,
            RuntimeError::Aborted => ErrorCategory::Aborted,
        }
    }

    /// 2 for configuration problems found before allocation, 1 for the rest
    pub fn exit_code(&self) -> i32 {
        match self {
            RuntimeError::Config(_) => 2,
            _ => 1,
        }
    }
}

impl ContextualError for RuntimeError {
    fn is_user_actionable(&self) -> bool {
        match self {
            RuntimeError::Config(e) => e.is_user_actionable(),
            RuntimeError::Adapter(e) => e.is_user_actionable(),
            RuntimeError::Process(e) => e.is_user_actionable(),
            RuntimeError::Aborted => true,
            _ => false,
        }
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            RuntimeError::Config(e) => e.user_message(),
            RuntimeError::Aborted => Some("run aborted by termination request"),
            _ => None,
        }
    }
}

pub type RuntimeResult<T> = Result<T, RuntimeError>;
