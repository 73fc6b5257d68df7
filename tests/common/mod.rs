//! Shared helpers for the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use repotrack::command::api::{CapturedOutput, CommandResult, Invocation, Launcher};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Launcher that answers every capture with the invocation's working directory,
/// which is what `rev-parse --show-toplevel` prints inside a top-level checkout
#[derive(Default)]
pub struct EchoCwdLauncher {
    pub captured: Mutex<Vec<Invocation>>,
    pub detached: Mutex<Vec<Invocation>>,
}

#[async_trait]
impl Launcher for EchoCwdLauncher {
    async fn capture(&self, invocation: &Invocation) -> CommandResult<CapturedOutput> {
        self.captured.lock().unwrap().push(invocation.clone());
        let cwd = invocation
            .working_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."));
        Ok(CapturedOutput {
            exit_code: Some(0),
            stdout: format!("{}\n", cwd.display()),
            stderr: String::new(),
        })
    }

    fn detach(&self, invocation: &Invocation) -> CommandResult<()> {
        self.detached.lock().unwrap().push(invocation.clone());
        Ok(())
    }
}

/// Create `root/rel` with a `.git` directory inside and return its path
pub fn make_repo(root: &Path, rel: &str) -> PathBuf {
    let repo = root.join(rel);
    std::fs::create_dir_all(repo.join(".git")).unwrap();
    repo
}

/// A canonical temporary directory, so paths compare equal to what git reports
pub fn canonical_tempdir() -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().canonicalize().unwrap();
    (dir, root)
}

/// Whether a usable `git` is on the PATH
pub fn git_available() -> bool {
    which::which("git").is_ok()
}

/// Run git synchronously in `dir`, panicking on failure
pub fn git(dir: &Path, args: &[&str]) {
    let status = std::process::Command::new("git")
        .args(args)
        .current_dir(dir)
        .status()
        .unwrap();
    assert!(status.success(), "git {:?} failed in {}", args, dir.display());
}
