//! Directory walker
//!
//! Depth-first search for directories holding a version-control marker, built on
//! `walkdir`. The walk is lazy: nothing is read until the iterator is polled. Every
//! call to [`Scanner::scan`] starts a fresh traversal.

use crate::scanner::filter::PathFilter;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, FilterEntry, WalkDir};

/// Entry that marks a repository working tree; a directory or, for linked
/// worktrees and submodules, a file
pub const VCS_MARKER: &str = ".git";

#[derive(Debug, Clone)]
pub struct Scanner {
    excludes: PathFilter,
    max_depth: Option<usize>,
}

type EntryFilter<'a> = Box<dyn FnMut(&DirEntry) -> bool + 'a>;

impl Scanner {
    /// `max_depth` bounds how far below the root the walk descends: with `Some(n)`
    /// directories down to level `n + 1` are examined, so `Some(0)` still finds
    /// repositories directly inside the root
    pub fn new(excludes: PathFilter, max_depth: Option<usize>) -> Self {
        Self {
            excludes,
            max_depth,
        }
    }

    /// Candidate directories below `root`, root included
    pub fn scan(&self, root: &Path) -> ScanIter<'_> {
        if !root.is_dir() {
            log::warn!("{} is not a directory, skipping", root.display());
            return ScanIter { entries: None };
        }

        let mut walk = WalkDir::new(root).follow_links(true).sort_by_file_name();
        if let Some(max) = self.max_depth {
            walk = walk.max_depth(max.saturating_add(1));
        }

        let excludes = &self.excludes;
        let filter: EntryFilter<'_> = Box::new(move |entry: &DirEntry| {
            if !entry.file_type().is_dir() {
                return false;
            }
            if excludes.is_excluded(entry.path()) {
                log::debug!("excluded {}", entry.path().display());
                return false;
            }
            true
        });

        ScanIter {
            entries: Some(walk.into_iter().filter_entry(filter)),
        }
    }
}

fn is_candidate(dir: &Path) -> bool {
    fs::symlink_metadata(dir.join(VCS_MARKER)).is_ok()
}

/// Lazy sequence of candidate directories
pub struct ScanIter<'a> {
    entries: Option<FilterEntry<walkdir::IntoIter, EntryFilter<'a>>>,
}

impl Iterator for ScanIter<'_> {
    type Item = PathBuf;

    fn next(&mut self) -> Option<PathBuf> {
        let entries = self.entries.as_mut()?;
        loop {
            match entries.next()? {
                Ok(entry) if is_candidate(entry.path()) => {
                    // a repository's own subdirectories are not scanned again
                    entries.skip_current_dir();
                    return Some(entry.into_path());
                }
                Ok(_) => {}
                // unreadable directories and symlink loops
                Err(e) => log::debug!("skipping: {}", e),
            }
        }
    }
}
