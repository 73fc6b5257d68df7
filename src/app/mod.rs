//! Application module

pub mod cli;
pub mod display;
pub mod error;
pub mod service;
pub mod startup;

pub use error::{ServiceError, ServiceResult};
pub use service::{DiscoverOutcome, RepoService};
