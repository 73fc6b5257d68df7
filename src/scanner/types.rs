//! Scanner Types
//!
//! Shared types used throughout the scanner module.

use crate::scanner::filter::PathFilter;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

/// A labelled group of directories to search, with its own depth and exclusions
#[derive(Debug, Clone)]
pub struct ScanRoot {
    pub label: String,
    pub paths: Vec<PathBuf>,
    /// Levels the walk may descend below each path; the path's own children are
    /// always examined, so `Some(n)` reaches level `n + 1`. `None` is unbounded
    pub max_depth: Option<usize>,
    pub excludes: PathFilter,
}

impl ScanRoot {
    pub fn new(label: &str, paths: Vec<PathBuf>) -> Self {
        Self {
            label: label.to_string(),
            paths,
            max_depth: None,
            excludes: PathFilter::default(),
        }
    }

    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_excludes(mut self, excludes: PathFilter) -> Self {
        self.excludes = excludes;
        self
    }
}

/// Per-root statistics from one discovery pass
#[derive(Debug, Clone, Serialize)]
pub struct RootSummary {
    pub label: String,
    /// Marked directories found by the walker
    pub candidates: usize,
    /// Distinct repositories resolved in this root, including ones another root
    /// also found
    pub repositories: usize,
    /// Candidates whose resolver process failed to start or timed out
    pub unresolved: usize,
    #[serde(serialize_with = "serialize_secs")]
    pub elapsed: Duration,
}

/// Result of a discovery pass
#[derive(Debug, Clone, Default, Serialize)]
pub struct DiscoveryReport {
    /// Distinct repository top-level directories, sorted
    pub repositories: Vec<PathBuf>,
    pub roots: Vec<RootSummary>,
    /// Scan paths where resolution failed; what is tracked below them is kept
    pub incomplete: Vec<PathBuf>,
}

fn serialize_secs<S: serde::Serializer>(elapsed: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(elapsed.as_secs_f64())
}
