//! Command Component
//!
//! Configured commands are templates rendered against one repository at a time and
//! executed either in capture mode (blocking, output collected) or detached (handed
//! off to the OS). Batch commands are applied across every tracked repository with
//! bounded concurrency, and maintenance commands can be gated by a cheap probe.

pub mod api;
pub mod error;
pub mod launcher;
pub mod maintenance;
pub mod runner;
pub mod shell;
pub mod spec;
pub mod template;

#[cfg(test)]
mod tests;

pub use error::{CommandError, CommandResult};
