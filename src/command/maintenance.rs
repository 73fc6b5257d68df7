//! Probe-gated maintenance
//!
//! A gate reads one whitespace-separated token from a probe's stdout and lets the
//! gated command run only when that value is strictly greater than the threshold.

use crate::command::launcher::Invocation;
use crate::command::spec::ProbeSpec;
use serde::Serialize;
use std::path::Path;

/// Loose-object size threshold in KB for housekeeping
pub const DEFAULT_MAINTENANCE_THRESHOLD_KB: u64 = 1024;

/// `git count-objects` prints `<count> objects, <size> kilobytes`
const COUNT_OBJECTS_SIZE_TOKEN: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gate {
    pub token: usize,
    pub threshold: u64,
}

impl From<&ProbeSpec> for Gate {
    fn from(probe: &ProbeSpec) -> Self {
        Self {
            token: probe.token,
            threshold: probe.threshold,
        }
    }
}

/// Why a gated command did not run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "kebab-case")]
pub enum SkipReason {
    BelowThreshold { value: u64, threshold: u64 },
    UnparsableProbe { output: String },
    ProbeFailed { exit_code: Option<i32> },
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::BelowThreshold { value, threshold } => {
                write!(f, "{} does not exceed {}", value, threshold)
            }
            SkipReason::UnparsableProbe { output } => {
                write!(f, "probe output '{}' has no usable value", output)
            }
            SkipReason::ProbeFailed { exit_code: Some(code) } => {
                write!(f, "probe exited with {}", code)
            }
            SkipReason::ProbeFailed { exit_code: None } => write!(f, "probe was terminated"),
        }
    }
}

/// Integer at whitespace token `token` (0-based) of the probe output
pub fn parse_probe_value(stdout: &str, token: usize) -> Option<u64> {
    stdout.split_whitespace().nth(token)?.parse().ok()
}

/// Housekeeping for one repository: `count-objects` as the probe, `gc` as the action.
///
/// Both call the version-control executable directly, without a shell.
pub fn housekeeping(vcs_executable: &str, repo_path: &Path, threshold_kb: u64) -> (Invocation, Invocation, Gate) {
    let probe = Invocation::new(vcs_executable)
        .arg("count-objects")
        .current_dir(repo_path);
    let action = Invocation::new(vcs_executable).arg("gc").current_dir(repo_path);
    let gate = Gate {
        token: COUNT_OBJECTS_SIZE_TOKEN,
        threshold: threshold_kb,
    };
    (probe, action, gate)
}
