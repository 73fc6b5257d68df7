//! Exclusion patterns for directory scanning
//!
//! A pattern without a separator matches a single directory name anywhere in the
//! tree (`node_modules`, `.*`). A pattern with a separator matches the whole path:
//! absolute patterns as written, relative ones at any depth (`vendor/*` behaves
//! like `**/vendor/*`).

use crate::core::validation::ValidationError;
use glob::{MatchOptions, Pattern};
use std::path::Path;

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: !cfg!(windows),
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

#[derive(Debug, Clone)]
enum Matcher {
    /// Matched against the last path component
    Name(Pattern),
    /// Matched against the full path
    Path(Pattern),
}

/// Compiled set of exclusion patterns
#[derive(Debug, Clone, Default)]
pub struct PathFilter {
    patterns: Vec<String>,
    matchers: Vec<Matcher>,
}

impl PathFilter {
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self, ValidationError> {
        let mut filter = Self::default();
        for pattern in patterns {
            filter.add(pattern.as_ref())?;
        }
        Ok(filter)
    }

    pub fn add(&mut self, pattern: &str) -> Result<(), ValidationError> {
        let matcher = compile(pattern)?;
        self.patterns.push(pattern.to_string());
        self.matchers.push(matcher);
        Ok(())
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }

    /// True when any pattern matches `path`
    pub fn is_excluded(&self, path: &Path) -> bool {
        if self.matchers.is_empty() {
            return false;
        }
        let full = normalize(&path.to_string_lossy());
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        self.matchers.iter().any(|matcher| match matcher {
            Matcher::Name(p) => !name.is_empty() && p.matches_with(&name, MATCH_OPTIONS),
            Matcher::Path(p) => p.matches_with(&full, MATCH_OPTIONS),
        })
    }
}

/// One-off check of a single pattern against a path
pub fn matches(pattern: &str, path: &Path) -> Result<bool, ValidationError> {
    Ok(PathFilter::new(&[pattern])?.is_excluded(path))
}

fn compile(pattern: &str) -> Result<Matcher, ValidationError> {
    let normalized = normalize(pattern.trim());
    let trimmed = normalized.trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(ValidationError::new(&format!(
            "Invalid exclude pattern '{}': pattern is empty",
            pattern
        )));
    }

    let (text, by_name) = if !trimmed.contains('/') {
        (trimmed.to_string(), true)
    } else if is_absolute(trimmed) {
        (trimmed.to_string(), false)
    } else {
        (format!("**/{}", trimmed.trim_start_matches("./")), false)
    };

    let compiled = Pattern::new(&text).map_err(|e| {
        ValidationError::new(&format!("Invalid exclude pattern '{}': {}", pattern, e))
    })?;
    Ok(if by_name {
        Matcher::Name(compiled)
    } else {
        Matcher::Path(compiled)
    })
}

fn normalize(text: &str) -> String {
    text.replace('\\', "/")
}

fn is_absolute(pattern: &str) -> bool {
    let bytes = pattern.as_bytes();
    pattern.starts_with('/')
        || (bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':')
}
