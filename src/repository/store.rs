//! Repository Store
//!
//! The tracked set lives in one pretty-printed JSON file, a list of `{name, path}`
//! records sorted by path. Saves replace the whole file atomically: the new content
//! is written to a temporary file in the same directory and renamed over the old.

use crate::repository::error::{StoreError, StoreResult};
use crate::repository::types::RepositorySet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// File name used inside the configuration directory
pub const STORE_FILE_NAME: &str = "repos.json";

#[derive(Debug)]
pub struct RepoStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl RepoStore {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The stored set, or `None` when nothing has been saved yet
    pub fn load(&self) -> StoreResult<Option<RepositorySet>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("no repository store at {}", self.path.display());
                return Ok(None);
            }
            Err(source) => {
                return Err(StoreError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let set: RepositorySet =
            serde_json::from_str(&content).map_err(|e| StoreError::Corrupt {
                path: self.path.clone(),
                message: e.to_string(),
            })?;
        log::debug!(
            "loaded {} repositories from {}",
            set.len(),
            self.path.display()
        );
        Ok(Some(set))
    }

    pub fn save(&self, set: &RepositorySet) -> StoreResult<()> {
        let write_error = |source| StoreError::Write {
            path: self.path.clone(),
            source,
        };

        let mut content = serde_json::to_string_pretty(set).map_err(|e| StoreError::Write {
            path: self.path.clone(),
            source: std::io::Error::other(e),
        })?;
        content.push('\n');

        // a poisoned lock still serializes writers
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir).map_err(write_error)?;

        let mut temp = tempfile::NamedTempFile::new_in(&dir).map_err(write_error)?;
        temp.write_all(content.as_bytes()).map_err(write_error)?;
        temp.as_file().sync_all().map_err(write_error)?;
        temp.persist(&self.path).map_err(|e| write_error(e.error))?;

        log::debug!("saved {} repositories to {}", set.len(), self.path.display());
        Ok(())
    }
}
