//! Configuration error types

use std::path::Path;

/// Configuration problems found before anything is allocated
///
/// Every variant is user-actionable: the operator fixes the environment,
/// the settings file or the command line.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("{message}")]
    Missing { name: &'static str, message: String },

    #[error("{message}")]
    Invalid { name: &'static str, message: String },

    #[error("{message}")]
    File { message: String },

    #[error("{message}")]
    UnknownAdapter { name: String, message: String },
}

impl ConfigError {
    pub fn missing(name: &'static str) -> Self {
        ConfigError::Missing {
            name,
            message: format!("missing {}", name),
        }
    }

    pub fn invalid(name: &'static str, value: &str, reason: impl std::fmt::Display) -> Self {
        ConfigError::Invalid {
            name,
            message: format!("invalid {} '{}': {}", name, value, reason),
        }
    }

    pub fn file(path: &Path, reason: impl std::fmt::Display) -> Self {
        ConfigError::File {
            message: format!("settings file {}: {}", path.display(), reason),
        }
    }

    pub fn unknown_adapter(name: &str, known: &[&str]) -> Self {
        ConfigError::UnknownAdapter {
            name: name.to_string(),
            message: format!("unknown adapter '{}' (known: {})", name, known.join(", ")),
        }
    }
}

impl crate::core::error_handling::ContextualError for ConfigError {
    fn is_user_actionable(&self) -> bool {
        true
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            ConfigError::Missing { message, .. }
            | ConfigError::Invalid { message, .. }
            | ConfigError::File { message }
            | ConfigError::UnknownAdapter { message, .. } => Some(message),
        }
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;
