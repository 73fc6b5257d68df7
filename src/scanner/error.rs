//! Scanner Error Types

/// Scanner error types
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// A background walker ended abnormally
    #[error("Scan worker failed: {message}")]
    Worker { message: String },
}

impl crate::core::error_handling::ContextualError for ScanError {
    fn is_user_actionable(&self) -> bool {
        match self {
            ScanError::Worker { .. } => false,
        }
    }

    fn user_message(&self) -> Option<&str> {
        None
    }
}

pub type ScanResult<T> = Result<T, ScanError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error_handling::{fatal_message, ContextualError};

    #[test]
    fn test_worker_failure_is_a_system_error() {
        let err = ScanError::Worker {
            message: "walker for 'work' failed: task panicked".to_string(),
        };
        assert!(!err.is_user_actionable());
        assert_eq!(
            fatal_message(&err, "Discovery"),
            "Discovery: Scan worker failed: walker for 'work' failed: task panicked"
        );
    }
}
