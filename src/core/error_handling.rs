//! Generic error handling utilities
//!
//! Provides unified fatal-error reporting that works across the component
//! error types while keeping their domain-specific messages.

/// Trait for errors that can distinguish between user-actionable and system errors
///
/// This trait enables generic error handling functions to determine whether an error
/// should show its own message directly or be prefixed with the failing operation.
///
/// # Implementation Consistency
/// **IMPORTANT**: When `is_user_actionable()` returns `true`, `user_message()` should return
/// `Some(message)` with a helpful, actionable message. When `is_user_actionable()` returns
/// `false`, `user_message()` should return `None`.
pub trait ContextualError: std::error::Error {
    /// Returns true if this error contains a specific, user-actionable message
    /// that should be displayed directly to the operator
    ///
    /// Examples of user-actionable errors:
    /// - Missing `INPUTS_URL`
    /// - Unknown adapter name
    /// - Checksum declared in the manifest does not match the download
    ///
    /// Examples of system errors:
    /// - IO failures
    /// - Network timeouts
    /// - Tool process failing to spawn
    fn is_user_actionable(&self) -> bool;

    /// Returns the specific user message if this is a user-actionable error
    fn user_message(&self) -> Option<&str>;
}

/// Build the single `FATAL:` line for an error
///
/// User-actionable errors show their own message; system errors are prefixed
/// with the operation that failed so the line still says where it happened.
pub fn fatal_line<E: ContextualError + std::fmt::Display>(
    error: &E,
    operation_context: &str,
) -> String {
    match error.user_message() {
        Some(user_msg) if error.is_user_actionable() => format!("FATAL: {}", user_msg),
        _ => format!("FATAL: {}: {}", operation_context, error),
    }
}

/// Log errors with appropriate detail level based on error specificity
///
/// Emits exactly one error-level `FATAL:` line; debug formatting of the error
/// is only logged at debug level.
pub fn log_error_with_context<E: ContextualError + std::fmt::Display + std::fmt::Debug>(
    error: &E,
    operation_context: &str,
) {
    log::error!("{}", fatal_line(error, operation_context));
    log::debug!("DEBUG_DETAILS: {:?}", error);
}
