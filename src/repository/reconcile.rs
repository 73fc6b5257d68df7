//! Reconciliation
//!
//! Merges a fresh discovery result into the tracked set. Matching is by path only:
//! entries seen again keep their name, unseen entries are dropped and new paths are
//! added with a default name.

use crate::repository::types::{Repository, RepositorySet};
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize)]
pub struct Reconciliation {
    pub set: RepositorySet,
    /// New repositories, in path order
    pub added: Vec<Repository>,
    /// Repositories that were tracked but not found again, in path order
    pub removed: Vec<Repository>,
}

impl Reconciliation {
    pub fn is_unchanged(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

pub fn reconcile<P: AsRef<Path>>(previous: &RepositorySet, fresh: &[P]) -> Reconciliation {
    reconcile_partial(previous, fresh, &[])
}

/// Reconcile against a pass that could not resolve everything below `incomplete`.
///
/// Tracked entries at or below one of those directories are kept even when they
/// were not found again.
pub fn reconcile_partial<P: AsRef<Path>>(
    previous: &RepositorySet,
    fresh: &[P],
    incomplete: &[PathBuf],
) -> Reconciliation {
    let fresh: BTreeSet<PathBuf> = fresh.iter().map(|p| p.as_ref().to_path_buf()).collect();

    let mut set = RepositorySet::new();
    let mut removed = Vec::new();
    for repository in previous {
        let unverified = incomplete
            .iter()
            .any(|dir| repository.path.starts_with(dir));
        if fresh.contains(&repository.path) || unverified {
            set.insert(repository.clone());
        } else {
            removed.push(repository.clone());
        }
    }

    let mut added = Vec::new();
    for path in &fresh {
        if !previous.contains(path) {
            let repository = Repository::discovered(path);
            set.insert(repository.clone());
            added.push(repository);
        }
    }

    Reconciliation { set, added, removed }
}

/// Drop entries whose path no longer exists on disk
pub fn remove_stale(set: &RepositorySet) -> (RepositorySet, Vec<Repository>) {
    remove_stale_with(set, |path| path.exists())
}

/// Drop entries for which `exists` is false
pub fn remove_stale_with<F>(set: &RepositorySet, exists: F) -> (RepositorySet, Vec<Repository>)
where
    F: Fn(&Path) -> bool,
{
    let mut kept = RepositorySet::new();
    let mut removed = Vec::new();
    for repository in set {
        if exists(&repository.path) {
            kept.insert(repository.clone());
        } else {
            removed.push(repository.clone());
        }
    }
    (kept, removed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(set: &RepositorySet) -> Vec<(String, PathBuf)> {
        set.iter().map(|r| (r.name.clone(), r.path.clone())).collect()
    }

    #[test]
    fn test_rename_survives_rescan() {
        let mut previous = RepositorySet::from_paths(["/p/r1"]);
        previous.rename(Path::new("/p/r1"), "renamed").unwrap();

        let result = reconcile(&previous, &["/p/r1", "/p/r2"]);

        assert_eq!(
            entries(&result.set),
            vec![
                ("renamed".to_string(), PathBuf::from("/p/r1")),
                ("r2".to_string(), PathBuf::from("/p/r2")),
            ]
        );
        assert_eq!(result.added.len(), 1);
        assert_eq!(result.added[0].path, PathBuf::from("/p/r2"));
        assert!(result.removed.is_empty());
    }

    #[test]
    fn test_vanished_paths_are_removed() {
        let previous = RepositorySet::from_paths(["/p/a", "/p/b"]);
        let result = reconcile(&previous, &["/p/b"]);
        assert_eq!(result.set.paths(), vec![PathBuf::from("/p/b")]);
        assert_eq!(result.removed.len(), 1);
        assert_eq!(result.removed[0].path, PathBuf::from("/p/a"));
    }

    #[test]
    fn test_reconcile_is_a_fixed_point() {
        let mut previous = RepositorySet::from_paths(["/p/a", "/p/b"]);
        previous.rename(Path::new("/p/b"), "bee").unwrap();

        let first = reconcile(&previous, &["/p/a", "/p/b"]);
        let second = reconcile(&first.set, &["/p/b", "/p/a"]);

        assert!(first.is_unchanged());
        assert!(second.is_unchanged());
        assert_eq!(entries(&second.set), entries(&previous));
    }

    #[test]
    fn test_incomplete_directories_keep_their_entries() {
        let mut previous = RepositorySet::from_paths(["/mnt/share/a", "/home/b", "/home/c"]);
        previous.rename(Path::new("/mnt/share/a"), "shared").unwrap();

        let result = reconcile_partial(
            &previous,
            &["/home/b", "/home/d"],
            &[PathBuf::from("/mnt/share")],
        );

        assert_eq!(
            entries(&result.set),
            vec![
                ("b".to_string(), PathBuf::from("/home/b")),
                ("d".to_string(), PathBuf::from("/home/d")),
                ("shared".to_string(), PathBuf::from("/mnt/share/a")),
            ]
        );
        assert_eq!(result.removed.len(), 1);
        assert_eq!(result.removed[0].path, PathBuf::from("/home/c"));
    }

    #[test]
    fn test_duplicate_fresh_paths_collapse() {
        let result = reconcile(&RepositorySet::new(), &["/p/a", "/p/a"]);
        assert_eq!(result.set.len(), 1);
        assert_eq!(result.added.len(), 1);
    }

    #[test]
    fn test_remove_stale_keeps_others_unchanged() {
        let mut set = RepositorySet::from_paths(["/p/a", "/p/gone", "/p/c"]);
        set.rename(Path::new("/p/c"), "sea").unwrap();

        let (kept, removed) = remove_stale_with(&set, |p| p != Path::new("/p/gone"));

        assert_eq!(
            entries(&kept),
            vec![
                ("a".to_string(), PathBuf::from("/p/a")),
                ("sea".to_string(), PathBuf::from("/p/c")),
            ]
        );
        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0].path, PathBuf::from("/p/gone"));
    }
}
