//! Repository Store Error Types

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Cannot read repository store {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Repository store {} is corrupt: {message}", .path.display())]
    Corrupt { path: PathBuf, message: String },

    #[error("Cannot write repository store {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{message}")]
    UnknownRepository { path: PathBuf, message: String },

    #[error("{message}")]
    InvalidName { message: String },
}

impl StoreError {
    pub fn unknown_repository(path: &std::path::Path) -> Self {
        StoreError::UnknownRepository {
            path: path.to_path_buf(),
            message: format!("{} is not a tracked repository", path.display()),
        }
    }
}

impl crate::core::error_handling::ContextualError for StoreError {
    fn is_user_actionable(&self) -> bool {
        matches!(
            self,
            StoreError::UnknownRepository { .. } | StoreError::InvalidName { .. }
        )
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            StoreError::UnknownRepository { message, .. } => Some(message),
            StoreError::InvalidName { message } => Some(message),
            _ => None,
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
