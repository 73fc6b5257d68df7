//! Repository Types

use crate::repository::error::{StoreError, StoreResult};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

/// A tracked repository.
///
/// Identity, ordering and hashing use `path` only; `name` is a user label.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Repository {
    pub name: String,
    pub path: PathBuf,
}

impl Repository {
    pub fn new(name: &str, path: &Path) -> Self {
        Self {
            name: name.to_string(),
            path: path.to_path_buf(),
        }
    }

    /// Repository named after the last component of its path
    pub fn discovered(path: &Path) -> Self {
        Self::new(&default_name(path), path)
    }
}

pub fn default_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

impl PartialEq for Repository {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

impl Eq for Repository {}

impl Hash for Repository {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.path.hash(state);
    }
}

impl PartialOrd for Repository {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Repository {
    fn cmp(&self, other: &Self) -> Ordering {
        self.path.cmp(&other.path)
    }
}

/// The tracked repositories keyed by path.
///
/// Serialized as a list sorted by path. A list with two entries for one path is
/// rejected when deserializing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Repository>", into = "Vec<Repository>")]
pub struct RepositorySet {
    entries: BTreeMap<PathBuf, Repository>,
}

impl RepositorySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set of freshly discovered repositories with default names
    pub fn from_paths<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut set = Self::new();
        for path in paths {
            set.insert(Repository::discovered(path.as_ref()));
        }
        set
    }

    /// Add `repository` unless its path is already tracked; true if added
    pub fn insert(&mut self, repository: Repository) -> bool {
        if self.entries.contains_key(&repository.path) {
            return false;
        }
        self.entries.insert(repository.path.clone(), repository);
        true
    }

    pub fn remove(&mut self, path: &Path) -> Option<Repository> {
        self.entries.remove(path)
    }

    pub fn get(&self, path: &Path) -> Option<&Repository> {
        self.entries.get(path)
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.entries.contains_key(path)
    }

    /// Change the display name of the repository at `path`; the path never changes
    pub fn rename(&mut self, path: &Path, name: &str) -> StoreResult<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StoreError::InvalidName {
                message: "Repository name cannot be empty".to_string(),
            });
        }
        let repository = self
            .entries
            .get_mut(path)
            .ok_or_else(|| StoreError::unknown_repository(path))?;
        repository.name = name.to_string();
        Ok(())
    }

    /// Repositories in path order
    pub fn iter(&self) -> impl Iterator<Item = &Repository> {
        self.entries.values()
    }

    pub fn paths(&self) -> Vec<PathBuf> {
        self.entries.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl TryFrom<Vec<Repository>> for RepositorySet {
    type Error = String;

    fn try_from(repositories: Vec<Repository>) -> Result<Self, Self::Error> {
        let mut set = Self::new();
        for repository in repositories {
            let path = repository.path.clone();
            if !set.insert(repository) {
                return Err(format!("duplicate entry for {}", path.display()));
            }
        }
        Ok(set)
    }
}

impl From<RepositorySet> for Vec<Repository> {
    fn from(set: RepositorySet) -> Self {
        set.entries.into_values().collect()
    }
}

impl<'a> IntoIterator for &'a RepositorySet {
    type Item = &'a Repository;
    type IntoIter = std::collections::btree_map::Values<'a, PathBuf, Repository>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.values()
    }
}
