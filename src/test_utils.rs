//! Shared test helpers

use crate::command::error::{CommandError, CommandResult};
use crate::command::launcher::{CapturedOutput, Invocation, Launcher};
use async_trait::async_trait;
use std::path::Path;
use std::sync::Mutex;

type Responder = dyn Fn(&Invocation) -> CommandResult<CapturedOutput> + Send + Sync;

/// Launcher that records every invocation and answers captures from a closure
pub struct RecordingLauncher {
    responder: Box<Responder>,
    captured: Mutex<Vec<Invocation>>,
    detached: Mutex<Vec<Invocation>>,
}

impl RecordingLauncher {
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(&Invocation) -> CommandResult<CapturedOutput> + Send + Sync + 'static,
    {
        Self {
            responder: Box::new(responder),
            captured: Mutex::new(Vec::new()),
            detached: Mutex::new(Vec::new()),
        }
    }

    /// Every capture succeeds with empty output
    pub fn succeeding() -> Self {
        Self::new(|_| Ok(ok_output("")))
    }

    /// Answers `rev-parse --show-toplevel` with the invocation's working directory
    pub fn top_level_is_cwd() -> Self {
        Self::new(|invocation| {
            let dir = invocation
                .working_dir
                .as_deref()
                .unwrap_or_else(|| Path::new("."));
            Ok(ok_output(&format!("{}\n", dir.display())))
        })
    }

    pub fn captured(&self) -> Vec<Invocation> {
        self.captured.lock().unwrap().clone()
    }

    pub fn detached(&self) -> Vec<Invocation> {
        self.detached.lock().unwrap().clone()
    }
}

#[async_trait]
impl Launcher for RecordingLauncher {
    async fn capture(&self, invocation: &Invocation) -> CommandResult<CapturedOutput> {
        self.captured.lock().unwrap().push(invocation.clone());
        (self.responder)(invocation)
    }

    fn detach(&self, invocation: &Invocation) -> CommandResult<()> {
        self.detached.lock().unwrap().push(invocation.clone());
        Ok(())
    }
}

pub fn ok_output(stdout: &str) -> CapturedOutput {
    CapturedOutput {
        exit_code: Some(0),
        stdout: stdout.to_string(),
        stderr: String::new(),
    }
}

pub fn failed_output(exit_code: i32, stderr: &str) -> CapturedOutput {
    CapturedOutput {
        exit_code: Some(exit_code),
        stdout: String::new(),
        stderr: stderr.to_string(),
    }
}

pub fn spawn_error(program: &str) -> CommandError {
    CommandError::Spawn {
        program: program.to_string(),
        source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
    }
}

/// Create `<root>/<rel>/.git` as a directory
pub fn make_repo(root: &Path, rel: &str) -> std::path::PathBuf {
    let repo = root.join(rel);
    std::fs::create_dir_all(repo.join(".git")).unwrap();
    repo
}
