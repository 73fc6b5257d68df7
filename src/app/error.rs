//! Application Error Types
//!
//! Wraps the domain errors so every collaborator operation has one error type.

use crate::command::error::CommandError;
use crate::core::error_handling::ContextualError;
use crate::repository::error::StoreError;
use crate::scanner::error::ScanError;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Command(#[from] CommandError),
}

impl ServiceError {
    fn inner(&self) -> &dyn ContextualError {
        match self {
            ServiceError::Scan(e) => e,
            ServiceError::Store(e) => e,
            ServiceError::Command(e) => e,
        }
    }
}

impl ContextualError for ServiceError {
    fn is_user_actionable(&self) -> bool {
        self.inner().is_user_actionable()
    }

    fn user_message(&self) -> Option<&str> {
        self.inner().user_message()
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
