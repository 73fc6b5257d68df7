//! Repository API

pub use crate::repository::error::{StoreError, StoreResult};
pub use crate::repository::reconcile::{
    reconcile, reconcile_partial, remove_stale, remove_stale_with, Reconciliation,
};
pub use crate::repository::store::{RepoStore, STORE_FILE_NAME};
pub use crate::repository::types::{default_name, Repository, RepositorySet};
