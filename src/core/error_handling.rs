//! Generic error handling utilities
//!
//! Provides unified error reporting across the domain error types while keeping
//! user-facing messages short.

/// Trait for errors that can distinguish between user-actionable and system errors
///
/// # Implementation Consistency
/// When `is_user_actionable()` returns `true`, `user_message()` should return
/// `Some(message)` with a helpful, actionable message. When it returns `false`,
/// `user_message()` should return `None`.
pub trait ContextualError: std::error::Error {
    /// Returns true if this error carries a message the user can act on
    /// (bad configuration, unknown repository, unknown command id)
    fn is_user_actionable(&self) -> bool;

    /// Returns the specific user message if this is a user-actionable error
    fn user_message(&self) -> Option<&str>;
}

/// Log errors with appropriate detail level based on error specificity
///
/// User-actionable errors show their own message; system errors show the
/// operation context. Full details always go to the debug level.
///
/// # Examples
/// ```rust,no_run
/// # use repotrack::core::error_handling::log_error_with_context;
/// # use repotrack::core::validation::ValidationError;
/// let err = ValidationError::new("scan-path.work has no 'paths'");
/// log_error_with_context(&err, "Configuration loading");
/// // Logs: "FATAL: scan-path.work has no 'paths'"
/// ```
pub fn log_error_with_context<E: ContextualError + std::fmt::Display + std::fmt::Debug>(
    error: &E,
    operation_context: &str,
) {
    log::error!("FATAL: {}", fatal_message(error, operation_context));
    log::debug!("DETAIL: {}", error);
    log::debug!("DEBUG_DETAILS: {:?}", error);
}

/// The primary line reported for a fatal error
pub fn fatal_message<E: ContextualError + ?Sized>(error: &E, operation_context: &str) -> String {
    match error.user_message() {
        Some(user_msg) if error.is_user_actionable() => user_msg.to_string(),
        _ => format!("{}: {}", operation_context, error),
    }
}
