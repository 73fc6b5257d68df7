//! Command Runner
//!
//! Executes rendered commands in capture or detached mode, runs probe-gated
//! commands and applies one command across many repositories.

use crate::command::error::CommandResult;
use crate::command::launcher::{CapturedOutput, Invocation, Launcher, SystemLauncher};
use crate::command::maintenance::{parse_probe_value, Gate, SkipReason};
use crate::command::shell::shell_invocation;
use crate::command::spec::{CommandSpec, ExecKind, RenderedCommand};
use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Result of one command invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum Outcome {
    /// Capture mode finished; the exit code may be non-zero
    Captured(CapturedOutput),
    /// Handed off to the OS
    Detached,
    /// The working directory is missing; nothing was started
    NotFound { working_dir: PathBuf },
    /// A precondition probe decided against running the command
    Skipped(SkipReason),
}

impl Outcome {
    /// True for a zero exit code or a successful hand-off
    pub fn is_success(&self) -> bool {
        match self {
            Outcome::Captured(output) => output.success(),
            Outcome::Detached | Outcome::Skipped(_) => true,
            Outcome::NotFound { .. } => false,
        }
    }
}

/// Per-repository result of a batch run
#[derive(Debug)]
pub struct RepoOutcome {
    pub repository: PathBuf,
    pub result: CommandResult<Outcome>,
}

impl RepoOutcome {
    pub fn is_success(&self) -> bool {
        matches!(&self.result, Ok(outcome) if outcome.is_success())
    }
}

#[derive(Clone)]
pub struct CommandRunner {
    launcher: Arc<dyn Launcher>,
}

impl CommandRunner {
    pub fn new(launcher: Arc<dyn Launcher>) -> Self {
        Self { launcher }
    }

    /// Runner backed by real processes with the given capture timeout
    pub fn system(timeout: Duration) -> Self {
        Self::new(Arc::new(SystemLauncher::new(timeout)))
    }

    pub fn launcher(&self) -> Arc<dyn Launcher> {
        Arc::clone(&self.launcher)
    }

    /// Run a rendered command through the platform shell
    pub async fn run(&self, rendered: &RenderedCommand) -> CommandResult<Outcome> {
        self.run_invocation(&shell_invocation(rendered), rendered.exec_kind)
            .await
    }

    /// Run an invocation, failing fast when its working directory is missing
    pub async fn run_invocation(
        &self,
        invocation: &Invocation,
        exec_kind: ExecKind,
    ) -> CommandResult<Outcome> {
        if let Some(dir) = &invocation.working_dir {
            if !dir.is_dir() {
                log::warn!("{} does not exist.", dir.display());
                return Ok(Outcome::NotFound {
                    working_dir: dir.clone(),
                });
            }
        }

        match exec_kind {
            ExecKind::Capture => {
                log::info!(
                    "running {} in {}",
                    invocation.display_line(),
                    describe_dir(invocation.working_dir.as_deref())
                );
                let output = self.launcher.capture(invocation).await?;
                log_captured_output(&output);
                log::info!(
                    "{} returned {}",
                    invocation.display_line(),
                    output
                        .exit_code
                        .map_or_else(|| "no exit code".to_string(), |c| c.to_string())
                );
                Ok(Outcome::Captured(output))
            }
            ExecKind::Detached => {
                log::debug!(
                    "launching {} in {}",
                    invocation.display_line(),
                    describe_dir(invocation.working_dir.as_deref())
                );
                self.launcher.detach(invocation)?;
                Ok(Outcome::Detached)
            }
        }
    }

    /// Check-then-act: capture the probe, read its value and run `action` only when
    /// the value exceeds the gate's threshold
    pub async fn run_gated(
        &self,
        probe: &Invocation,
        action: &Invocation,
        action_kind: ExecKind,
        gate: Gate,
    ) -> CommandResult<Outcome> {
        let probe_output = match self.run_invocation(probe, ExecKind::Capture).await? {
            Outcome::Captured(output) => output,
            other => return Ok(other),
        };

        if !probe_output.success() {
            log::warn!(
                "probe {} failed: {}",
                probe.display_line(),
                probe_output.first_error_line()
            );
            return Ok(Outcome::Skipped(SkipReason::ProbeFailed {
                exit_code: probe_output.exit_code,
            }));
        }

        let Some(value) = parse_probe_value(&probe_output.stdout, gate.token) else {
            log::warn!(
                "could not read a number from token {} of '{}', skipping",
                gate.token,
                probe_output.stdout.trim()
            );
            return Ok(Outcome::Skipped(SkipReason::UnparsableProbe {
                output: probe_output.stdout.trim().to_string(),
            }));
        };

        if value <= gate.threshold {
            log::info!(
                "probe value {} does not exceed {}, not running {}",
                value,
                gate.threshold,
                action.display_line()
            );
            return Ok(Outcome::Skipped(SkipReason::BelowThreshold {
                value,
                threshold: gate.threshold,
            }));
        }

        self.run_invocation(action, action_kind).await
    }

    /// Render `spec` for one repository and run it, honouring its probe
    pub async fn run_spec(&self, spec: &CommandSpec, repo_path: &Path) -> CommandResult<Outcome> {
        let rendered = spec.render(repo_path);
        match (&spec.probe, spec.render_probe(repo_path)) {
            (Some(probe_spec), Some(probe)) => {
                self.run_gated(
                    &shell_invocation(&probe),
                    &shell_invocation(&rendered),
                    rendered.exec_kind,
                    Gate::from(probe_spec),
                )
                .await
            }
            _ => self.run(&rendered).await,
        }
    }

    /// Run `spec` once per repository with at most `jobs` in flight.
    ///
    /// A failure never stops the batch; outcomes come back in input order.
    pub async fn run_all(
        &self,
        spec: &CommandSpec,
        repositories: &[PathBuf],
        jobs: usize,
    ) -> Vec<RepoOutcome> {
        stream::iter(repositories)
            .map(|repo_path| async move {
                let result = self.run_spec(spec, repo_path).await;
                if let Err(e) = &result {
                    log::warn!("{} failed in {}: {}", spec.id, repo_path.display(), e);
                }
                RepoOutcome {
                    repository: repo_path.clone(),
                    result,
                }
            })
            .buffered(jobs.max(1))
            .collect()
            .await
    }
}

fn describe_dir(dir: Option<&Path>) -> String {
    dir.map_or_else(
        || "the current directory".to_string(),
        |d| d.display().to_string(),
    )
}

fn log_captured_output(output: &CapturedOutput) {
    let stdout = output.stdout.trim_end();
    if !stdout.is_empty() {
        log::info!("{}", stdout);
    }
    let stderr = output.stderr.trim_end();
    if !stderr.is_empty() {
        if output.success() {
            log::info!("{}", stderr);
        } else {
            log::warn!("{}", stderr);
        }
    }
}
