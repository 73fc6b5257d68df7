//! Repository Component
//!
//! The tracked repository set, its reconciliation with discovery results and its
//! persistent store.

pub mod api;
pub mod error;
pub mod reconcile;
pub mod store;
pub mod types;

pub use error::{StoreError, StoreResult};
