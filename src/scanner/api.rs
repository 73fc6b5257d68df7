//! Scanner API
//!
//! Public exports of the scanner system, following the same pattern as the
//! command and repository api modules.

pub use crate::scanner::discovery::{Discovery, DEFAULT_JOBS};
pub use crate::scanner::error::{ScanError, ScanResult};
pub use crate::scanner::filter::{matches, PathFilter};
pub use crate::scanner::resolver::RepoResolver;
pub use crate::scanner::types::{DiscoveryReport, RootSummary, ScanRoot};
pub use crate::scanner::walker::{ScanIter, Scanner, VCS_MARKER};
