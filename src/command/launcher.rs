//! Process launching
//!
//! Everything that starts an external process goes through [`Launcher`]. The system
//! implementation uses tokio for blocking captures (bounded by a timeout) and the
//! standard library for detached launches that are never waited on.

use crate::command::error::{CommandError, CommandResult};
use crate::command::shell::shell_join;
use async_trait::async_trait;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

/// Default bound for one captured process
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(300);

/// A fully resolved process invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub working_dir: Option<PathBuf>,
}

impl Invocation {
    pub fn new(program: &str) -> Self {
        Self {
            program: program.to_string(),
            args: Vec::new(),
            working_dir: None,
        }
    }

    pub fn arg(mut self, arg: &str) -> Self {
        self.args.push(arg.to_string());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_string()));
        self
    }

    pub fn current_dir(mut self, dir: &Path) -> Self {
        self.working_dir = Some(dir.to_path_buf());
        self
    }

    /// Printable form for log lines
    pub fn display_line(&self) -> String {
        let mut parts = Vec::with_capacity(self.args.len() + 1);
        parts.push(self.program.clone());
        parts.extend(self.args.iter().cloned());
        shell_join(&parts)
    }
}

/// Exit status and output of a captured process
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CapturedOutput {
    /// `None` when the process was terminated by a signal
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CapturedOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// First non-empty line of stderr, falling back to stdout
    pub fn first_error_line(&self) -> String {
        self.stderr
            .lines()
            .chain(self.stdout.lines())
            .map(str::trim)
            .find(|line| !line.is_empty())
            .unwrap_or("unknown error")
            .to_string()
    }
}

#[async_trait]
pub trait Launcher: Send + Sync {
    /// Run to completion and collect the output
    async fn capture(&self, invocation: &Invocation) -> CommandResult<CapturedOutput>;

    /// Start without waiting or collecting output
    fn detach(&self, invocation: &Invocation) -> CommandResult<()>;
}

/// Launcher backed by real processes
#[derive(Debug, Clone)]
pub struct SystemLauncher {
    timeout: Duration,
}

impl SystemLauncher {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Default for SystemLauncher {
    fn default() -> Self {
        Self::new(DEFAULT_COMMAND_TIMEOUT)
    }
}

#[async_trait]
impl Launcher for SystemLauncher {
    async fn capture(&self, invocation: &Invocation) -> CommandResult<CapturedOutput> {
        let mut command = tokio::process::Command::new(&invocation.program);
        command
            .args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // the child is killed if the timeout drops the wait future
            .kill_on_drop(true);
        if let Some(dir) = &invocation.working_dir {
            command.current_dir(dir);
        }

        let child = command.spawn().map_err(|source| CommandError::Spawn {
            program: invocation.program.clone(),
            source,
        })?;

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| CommandError::Timeout {
                program: invocation.program.clone(),
                timeout: self.timeout,
            })?
            .map_err(|source| CommandError::Spawn {
                program: invocation.program.clone(),
                source,
            })?;

        Ok(CapturedOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }

    fn detach(&self, invocation: &Invocation) -> CommandResult<()> {
        let mut command = std::process::Command::new(&invocation.program);
        command
            .args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        if let Some(dir) = &invocation.working_dir {
            command.current_dir(dir);
        }

        command
            .spawn()
            .map(|_child| ())
            .map_err(|source| CommandError::Spawn {
                program: invocation.program.clone(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invocation_builder() {
        let invocation = Invocation::new("git")
            .args(["rev-parse", "--show-toplevel"])
            .current_dir(Path::new("/work/a"));
        assert_eq!(invocation.program, "git");
        assert_eq!(invocation.args, vec!["rev-parse", "--show-toplevel"]);
        assert_eq!(invocation.working_dir, Some(PathBuf::from("/work/a")));
        assert_eq!(invocation.display_line(), "git rev-parse --show-toplevel");
    }

    #[test]
    fn test_captured_output_error_line() {
        let output = CapturedOutput {
            exit_code: Some(128),
            stdout: String::new(),
            stderr: "\nfatal: not a git repository\nhint: ...".to_string(),
        };
        assert!(!output.success());
        assert_eq!(output.first_error_line(), "fatal: not a git repository");
    }

    #[tokio::test]
    async fn test_capture_missing_program_is_spawn_error() {
        let launcher = SystemLauncher::default();
        let result = launcher
            .capture(&Invocation::new("repotrack-no-such-program-7f3a"))
            .await;
        assert!(matches!(result, Err(CommandError::Spawn { .. })));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_capture_collects_output_and_exit_code() {
        let launcher = SystemLauncher::default();
        let output = launcher
            .capture(&Invocation::new("sh").args(["-c", "echo out; echo err >&2; exit 3"]))
            .await
            .unwrap();
        assert_eq!(output.exit_code, Some(3));
        assert_eq!(output.stdout, "out\n");
        assert_eq!(output.stderr, "err\n");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_capture_times_out() {
        let launcher = SystemLauncher::new(Duration::from_millis(100));
        let result = launcher
            .capture(&Invocation::new("sh").args(["-c", "sleep 5"]))
            .await;
        assert!(matches!(result, Err(CommandError::Timeout { .. })));
    }
}
