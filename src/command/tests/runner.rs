//! Tests for the command runner
//!
//! All tests use a recording launcher; nothing here starts a real process.

use crate::command::maintenance::{housekeeping, SkipReason};
use crate::command::runner::{CommandRunner, Outcome};
use crate::command::spec::{CommandMode, CommandSpec, ExecKind, ProbeSpec};
use crate::command::template::CommandTemplate;
use crate::test_utils::{failed_output, make_repo, ok_output, spawn_error, RecordingLauncher};
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

fn template(s: &str) -> CommandTemplate {
    CommandTemplate::parse(s, "test").unwrap()
}

fn runner_with(launcher: &Arc<RecordingLauncher>) -> CommandRunner {
    CommandRunner::new(launcher.clone())
}

#[tokio::test]
async fn test_capture_runs_through_shell_in_working_dir() {
    let temp = TempDir::new().unwrap();
    let repo = make_repo(temp.path(), "a");
    let launcher = Arc::new(RecordingLauncher::new(|_| Ok(ok_output("clean\n"))));

    let spec = CommandSpec::new("status", "git", CommandMode::Interactive)
        .with_args(template("status"))
        .with_working_dir(template("{repo_path}"))
        .with_exec_kind(ExecKind::Capture);

    let outcome = runner_with(&launcher).run_spec(&spec, &repo).await.unwrap();

    assert!(matches!(&outcome, Outcome::Captured(output) if output.stdout == "clean\n"));
    assert!(outcome.is_success());
    let calls = launcher.captured();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].args.last().map(String::as_str), Some("git status"));
    assert_eq!(calls[0].working_dir.as_deref(), Some(repo.as_path()));
    assert!(launcher.detached().is_empty());
}

#[tokio::test]
async fn test_detached_is_handed_off() {
    let temp = TempDir::new().unwrap();
    let repo = make_repo(temp.path(), "a");
    let launcher = Arc::new(RecordingLauncher::succeeding());

    let spec = CommandSpec::new("open", "gitk", CommandMode::Interactive);
    let outcome = runner_with(&launcher).run_spec(&spec, &repo).await.unwrap();

    assert_eq!(outcome, Outcome::Detached);
    assert!(launcher.captured().is_empty());
    let detached = launcher.detached();
    assert_eq!(detached.len(), 1);
    assert!(detached[0].args.last().unwrap().contains(&repo.display().to_string()));
}

#[tokio::test]
async fn test_missing_working_dir_starts_nothing() {
    let temp = TempDir::new().unwrap();
    let gone = temp.path().join("gone");
    let launcher = Arc::new(RecordingLauncher::succeeding());

    let spec = CommandSpec::new("status", "git", CommandMode::Interactive)
        .with_working_dir(template("{repo_path}"))
        .with_exec_kind(ExecKind::Capture);
    let outcome = runner_with(&launcher).run_spec(&spec, &gone).await.unwrap();

    assert_eq!(outcome, Outcome::NotFound { working_dir: gone });
    assert!(!outcome.is_success());
    assert!(launcher.captured().is_empty());
    assert!(launcher.detached().is_empty());
}

#[tokio::test]
async fn test_non_zero_exit_is_reported_not_raised() {
    let temp = TempDir::new().unwrap();
    let repo = make_repo(temp.path(), "a");
    let launcher = Arc::new(RecordingLauncher::new(|_| {
        Ok(failed_output(1, "error: pathspec"))
    }));

    let spec = CommandSpec::new("status", "git", CommandMode::AllRepos)
        .with_exec_kind(ExecKind::Capture);
    let outcome = runner_with(&launcher).run_spec(&spec, &repo).await.unwrap();

    assert!(matches!(&outcome, Outcome::Captured(output) if output.exit_code == Some(1)));
    assert!(!outcome.is_success());
}

fn gc_spec(threshold: u64) -> CommandSpec {
    CommandSpec::new("gc", "git", CommandMode::Interactive)
        .with_args(template("gc"))
        .with_working_dir(template("{repo_path}"))
        .with_exec_kind(ExecKind::Capture)
        .with_probe(ProbeSpec {
            args: template("count-objects"),
            token: 2,
            threshold,
        })
}

#[tokio::test]
async fn test_probe_below_threshold_skips_command() {
    let temp = TempDir::new().unwrap();
    let repo = make_repo(temp.path(), "a");
    let launcher = Arc::new(RecordingLauncher::new(|_| {
        Ok(ok_output("7 objects, 3 kilobytes\n"))
    }));

    let outcome = runner_with(&launcher)
        .run_spec(&gc_spec(10), &repo)
        .await
        .unwrap();

    assert_eq!(
        outcome,
        Outcome::Skipped(SkipReason::BelowThreshold {
            value: 3,
            threshold: 10
        })
    );
    assert_eq!(launcher.captured().len(), 1);
}

#[tokio::test]
async fn test_probe_above_threshold_runs_command() {
    let temp = TempDir::new().unwrap();
    let repo = make_repo(temp.path(), "a");
    let launcher = Arc::new(RecordingLauncher::new(|invocation| {
        if invocation.args.last().is_some_and(|a| a.ends_with("count-objects")) {
            Ok(ok_output("120 objects, 50 kilobytes\n"))
        } else {
            Ok(ok_output(""))
        }
    }));

    let outcome = runner_with(&launcher)
        .run_spec(&gc_spec(10), &repo)
        .await
        .unwrap();

    assert!(matches!(outcome, Outcome::Captured(_)));
    let calls = launcher.captured();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[1].args.last().map(String::as_str), Some("git gc"));
}

#[tokio::test]
async fn test_threshold_is_strict() {
    let temp = TempDir::new().unwrap();
    let repo = make_repo(temp.path(), "a");
    let launcher = Arc::new(RecordingLauncher::new(|_| {
        Ok(ok_output("1 objects, 10 kilobytes\n"))
    }));

    let outcome = runner_with(&launcher)
        .run_spec(&gc_spec(10), &repo)
        .await
        .unwrap();

    assert!(matches!(outcome, Outcome::Skipped(SkipReason::BelowThreshold { .. })));
}

#[tokio::test]
async fn test_failed_or_unreadable_probe_skips_command() {
    let temp = TempDir::new().unwrap();
    let repo = make_repo(temp.path(), "a");

    let failing = Arc::new(RecordingLauncher::new(|_| Ok(failed_output(128, "fatal"))));
    let outcome = runner_with(&failing)
        .run_spec(&gc_spec(10), &repo)
        .await
        .unwrap();
    assert_eq!(
        outcome,
        Outcome::Skipped(SkipReason::ProbeFailed {
            exit_code: Some(128)
        })
    );

    let garbled = Arc::new(RecordingLauncher::new(|_| Ok(ok_output("no numbers here"))));
    let outcome = runner_with(&garbled)
        .run_spec(&gc_spec(10), &repo)
        .await
        .unwrap();
    assert!(matches!(outcome, Outcome::Skipped(SkipReason::UnparsableProbe { .. })));
    assert_eq!(garbled.captured().len(), 1);
}

#[tokio::test]
async fn test_housekeeping_calls_executable_directly() {
    let temp = TempDir::new().unwrap();
    let repo = make_repo(temp.path(), "a");
    let launcher = Arc::new(RecordingLauncher::new(|invocation| {
        if invocation.args == ["count-objects"] {
            Ok(ok_output("3000 objects, 2048 kilobytes\n"))
        } else {
            Ok(ok_output(""))
        }
    }));

    let (probe, action, gate) = housekeeping("git", &repo, 1024);
    let outcome = runner_with(&launcher)
        .run_gated(&probe, &action, ExecKind::Capture, gate)
        .await
        .unwrap();

    assert!(outcome.is_success());
    let calls = launcher.captured();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].program, "git");
    assert_eq!(calls[1].args, vec!["gc"]);
}

#[tokio::test]
async fn test_run_all_keeps_order_and_continues_after_failure() {
    let temp = TempDir::new().unwrap();
    let r1 = make_repo(temp.path(), "r1");
    let r2 = make_repo(temp.path(), "r2");
    let r3 = make_repo(temp.path(), "r3");
    let failing_dir = r2.clone();
    let launcher = Arc::new(RecordingLauncher::new(move |invocation| {
        if invocation.working_dir.as_deref() == Some(failing_dir.as_path()) {
            Err(spawn_error("sh"))
        } else {
            Ok(ok_output("ok"))
        }
    }));

    let spec = CommandSpec::new("fetch", "git", CommandMode::AllRepos)
        .with_args(template("fetch"))
        .with_exec_kind(ExecKind::Capture);
    let repos = vec![r1.clone(), r2.clone(), r3.clone()];
    let outcomes = runner_with(&launcher).run_all(&spec, &repos, 2).await;

    let order: Vec<PathBuf> = outcomes.iter().map(|o| o.repository.clone()).collect();
    assert_eq!(order, repos);
    assert!(outcomes[0].is_success());
    assert!(outcomes[1].result.is_err());
    assert!(outcomes[2].is_success());

    let mut dirs: Vec<PathBuf> = launcher
        .captured()
        .into_iter()
        .filter_map(|i| i.working_dir)
        .collect();
    dirs.sort();
    assert_eq!(dirs, vec![r1, r2, r3]);
}

#[tokio::test]
async fn test_run_all_reports_missing_repository() {
    let temp = TempDir::new().unwrap();
    let present = make_repo(temp.path(), "present");
    let missing = temp.path().join("missing");
    let launcher = Arc::new(RecordingLauncher::succeeding());

    let spec = CommandSpec::new("fetch", "git", CommandMode::AllRepos)
        .with_exec_kind(ExecKind::Capture);
    let outcomes = runner_with(&launcher)
        .run_all(&spec, &[present, missing.clone()], 4)
        .await;

    assert!(outcomes[0].is_success());
    assert!(matches!(
        &outcomes[1].result,
        Ok(Outcome::NotFound { working_dir }) if *working_dir == missing
    ));
    assert_eq!(launcher.captured().len(), 1);
}
