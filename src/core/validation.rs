//! Validation utilities for configuration values

use std::fmt;

/// A user-actionable validation failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    message: String,
}

impl ValidationError {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ValidationError {}

impl crate::core::error_handling::ContextualError for ValidationError {
    fn is_user_actionable(&self) -> bool {
        true
    }

    fn user_message(&self) -> Option<&str> {
        Some(&self.message)
    }
}

/// Validate glob pattern syntax
pub fn validate_glob_pattern(pattern: &str) -> Result<String, ValidationError> {
    match glob::Pattern::new(pattern) {
        Ok(_) => Ok(pattern.to_string()),
        Err(e) => Err(ValidationError::new(&format!(
            "Invalid glob pattern '{}': {}",
            pattern, e
        ))),
    }
}

/// Validate a strictly positive integer setting
pub fn validate_positive_int(value: i64, field: &str) -> Result<usize, ValidationError> {
    if value <= 0 {
        return Err(ValidationError::new(&format!(
            "'{}' must be greater than 0 (got {})",
            field, value
        )));
    }
    usize::try_from(value).map_err(|_| {
        ValidationError::new(&format!("'{}' is out of range (got {})", field, value))
    })
}

/// Validate that a string setting is present and not blank.
///
/// `field` is the dotted key, e.g. `cmd.status.cmd`.
pub fn validate_non_empty<'a>(
    value: Option<&'a str>,
    field: &str,
) -> Result<&'a str, ValidationError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => {
            let (section, key) = field.rsplit_once('.').unwrap_or(("configuration", field));
            Err(ValidationError::new(&format!(
                "{} has no '{}'",
                section, key
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_glob_pattern() {
        assert!(validate_glob_pattern("node_modules").is_ok());
        assert!(validate_glob_pattern("**/target").is_ok());
        assert!(validate_glob_pattern("[").is_err());
    }

    #[test]
    fn test_validate_positive_int() {
        assert_eq!(validate_positive_int(5, "jobs").unwrap(), 5);
        let err = validate_positive_int(0, "jobs").unwrap_err();
        assert!(err.message().contains("'jobs' must be greater than 0"));
        assert!(validate_positive_int(-3, "jobs").is_err());
    }

    #[test]
    fn test_validate_non_empty() {
        assert_eq!(validate_non_empty(Some(" git "), "cmd.status.cmd").unwrap(), "git");
        let err = validate_non_empty(Some("  "), "cmd.status.cmd").unwrap_err();
        assert_eq!(err.message(), "cmd.status has no 'cmd'");
        assert!(validate_non_empty(None, "cmd.status.cmd").is_err());
    }
}
