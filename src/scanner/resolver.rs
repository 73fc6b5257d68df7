//! Repository top-level resolution
//!
//! Asks the version-control executable for the top-level directory of a candidate.
//! A candidate that does not resolve is an expected outcome: it is logged at debug
//! level and reported as `Ok(None)`. A resolver process that cannot be started or
//! does not finish in time says nothing about the candidate and is returned as an
//! error.

use crate::command::error::CommandResult;
use crate::command::launcher::{Invocation, Launcher};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

#[derive(Clone)]
pub struct RepoResolver {
    vcs_executable: String,
    launcher: Arc<dyn Launcher>,
}

impl RepoResolver {
    pub fn new(vcs_executable: &str, launcher: Arc<dyn Launcher>) -> Self {
        Self {
            vcs_executable: vcs_executable.to_string(),
            launcher,
        }
    }

    pub fn vcs_executable(&self) -> &str {
        &self.vcs_executable
    }

    /// Top-level directory of the repository containing `candidate`
    pub async fn resolve_top_level(&self, candidate: &Path) -> CommandResult<Option<PathBuf>> {
        if !candidate.exists() {
            log::debug!("{} no longer exists", candidate.display());
            return Ok(None);
        }
        let cwd = match candidate.parent() {
            Some(parent) if !candidate.is_dir() => parent,
            _ => candidate,
        };

        let invocation = Invocation::new(&self.vcs_executable)
            .args(["rev-parse", "--show-toplevel"])
            .current_dir(cwd);

        let output = self.launcher.capture(&invocation).await?;
        if !output.success() {
            log::debug!(
                "{} is not a repository: {}",
                candidate.display(),
                output.first_error_line()
            );
            return Ok(None);
        }

        let resolved = parse_top_level(&output.stdout, cwd);
        if resolved.is_none() {
            log::debug!("no top-level reported for {}", candidate.display());
        }
        Ok(resolved)
    }
}

/// Absolute, normalized path from the first line of `stdout`.
///
/// A relative answer is taken relative to `cwd`.
pub fn parse_top_level(stdout: &str, cwd: &Path) -> Option<PathBuf> {
    let line = stdout.lines().next()?.trim();
    if line.is_empty() {
        return None;
    }
    let reported = PathBuf::from(line);
    let absolute = if reported.is_absolute() {
        reported
    } else {
        cwd.join(reported)
    };
    Some(normalize(&absolute))
}

/// Lexically drop `.` and resolve `..`, using the platform separator
fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}
