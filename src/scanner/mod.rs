//! Scanner Component
//!
//! Finds version-control repositories below configured scan roots.
//!
//! ## Core Features
//!
//! - **PathFilter**: glob exclusions that cut whole subtrees from the walk
//! - **Scanner**: lazy, restartable depth-first walk yielding marked directories
//! - **RepoResolver**: canonical top-level path from the version-control executable
//! - **Discovery**: one pass over all roots with bounded concurrency and
//!   deduplication by path

pub mod api;
pub mod discovery;
pub mod error;
pub mod filter;
pub mod resolver;
pub mod types;
pub mod walker;

#[cfg(test)]
mod tests;

pub use error::{ScanError, ScanResult};
