//! Repository service
//!
//! The operations offered to a front end: discovery, listing, rename, stale
//! removal, running configured commands and housekeeping. The tracked set is held
//! in memory behind one lock and written back through the store after every change,
//! so there is exactly one writer at a time.

use crate::app::error::ServiceResult;
use crate::command::error::CommandError;
use crate::command::launcher::{Launcher, SystemLauncher};
use crate::command::maintenance::housekeeping;
use crate::command::runner::{CommandRunner, Outcome, RepoOutcome};
use crate::command::spec::{CommandMode, CommandSpec, ExecKind};
use crate::core::config::ConfigSnapshot;
use crate::repository::error::StoreError;
use crate::repository::reconcile::{reconcile_partial, remove_stale};
use crate::repository::store::RepoStore;
use crate::repository::types::{Repository, RepositorySet};
use crate::scanner::discovery::Discovery;
use crate::scanner::resolver::RepoResolver;
use crate::scanner::types::DiscoveryReport;
use crate::scanner::walker::VCS_MARKER;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Result of a discovery pass after reconciliation
#[derive(Debug, Clone, Serialize)]
pub struct DiscoverOutcome {
    pub added: Vec<Repository>,
    pub removed: Vec<Repository>,
    pub report: DiscoveryReport,
}

pub struct RepoService {
    config: ConfigSnapshot,
    store: RepoStore,
    discovery: Discovery,
    runner: CommandRunner,
    repositories: Mutex<RepositorySet>,
    /// Outcome of the first-run pass until [`RepoService::scan`] reports it
    initial_scan: Mutex<Option<DiscoverOutcome>>,
}

impl RepoService {
    /// Open the service with real process launchers
    pub async fn open(config: ConfigSnapshot) -> ServiceResult<Self> {
        let resolve_launcher = Arc::new(SystemLauncher::new(config.resolve_timeout));
        let command_launcher = Arc::new(SystemLauncher::new(config.command_timeout));
        Self::open_with(config, resolve_launcher, command_launcher).await
    }

    /// Open the service, loading the stored set or running a first discovery pass
    /// when nothing has been stored yet
    pub async fn open_with(
        config: ConfigSnapshot,
        resolve_launcher: Arc<dyn Launcher>,
        command_launcher: Arc<dyn Launcher>,
    ) -> ServiceResult<Self> {
        let store = RepoStore::new(&config.store_path);
        let stored = store.load()?;
        let first_run = stored.is_none();

        let service = Self {
            discovery: Discovery::new(
                RepoResolver::new(&config.vcs_executable, resolve_launcher),
                config.jobs,
            ),
            runner: CommandRunner::new(command_launcher),
            repositories: Mutex::new(stored.unwrap_or_default()),
            initial_scan: Mutex::new(None),
            store,
            config,
        };

        if first_run {
            log::info!("No repository list found, scanning");
            let outcome = service.discover().await?;
            *service.initial_scan.lock().await = Some(outcome);
        }
        Ok(service)
    }

    pub fn config(&self) -> &ConfigSnapshot {
        &self.config
    }

    /// Discovery on request: the first-run pass made by `open` when it has not been
    /// reported yet, otherwise a fresh [`RepoService::discover`]
    pub async fn scan(&self) -> ServiceResult<DiscoverOutcome> {
        if let Some(outcome) = self.initial_scan.lock().await.take() {
            return Ok(outcome);
        }
        self.discover().await
    }

    /// Rescan every root and reconcile the result with the tracked set
    pub async fn discover(&self) -> ServiceResult<DiscoverOutcome> {
        let report = self.discovery.run(&self.config.scan_roots).await?;

        let mut repositories = self.repositories.lock().await;
        let reconciliation = reconcile_partial(
            &repositories,
            report.repositories.as_slice(),
            &report.incomplete,
        );
        self.store.save(&reconciliation.set)?;
        *repositories = reconciliation.set;

        for repository in &reconciliation.added {
            log::info!("added {} ({})", repository.name, repository.path.display());
        }
        for repository in &reconciliation.removed {
            log::info!("removed {} ({})", repository.name, repository.path.display());
        }

        Ok(DiscoverOutcome {
            added: reconciliation.added,
            removed: reconciliation.removed,
            report,
        })
    }

    /// Tracked repositories in path order
    pub async fn list_repositories(&self) -> Vec<Repository> {
        self.repositories.lock().await.iter().cloned().collect()
    }

    pub async fn rename(&self, path: &Path, name: &str) -> ServiceResult<Repository> {
        let mut repositories = self.repositories.lock().await;
        let path = tracked_path(&repositories, path)?;

        let mut updated = repositories.clone();
        updated.rename(&path, name)?;
        self.store.save(&updated)?;
        *repositories = updated;

        let renamed = repositories
            .get(&path)
            .cloned()
            .ok_or_else(|| StoreError::unknown_repository(&path))?;
        log::info!("renamed {} to {}", path.display(), renamed.name);
        Ok(renamed)
    }

    /// Drop repositories whose directory has disappeared
    pub async fn remove_stale(&self) -> ServiceResult<Vec<Repository>> {
        let mut repositories = self.repositories.lock().await;
        let (kept, removed) = remove_stale(&repositories);
        if removed.is_empty() {
            return Ok(removed);
        }

        self.store.save(&kept)?;
        *repositories = kept;
        for repository in &removed {
            log::info!("removed {} ({})", repository.name, repository.path.display());
        }
        Ok(removed)
    }

    /// Run the interactive command `command_id` against one tracked repository
    pub async fn run_on_one(&self, repo_path: &Path, command_id: &str) -> ServiceResult<Outcome> {
        let spec = self.command(CommandMode::Interactive, command_id)?;
        let path = self.tracked(repo_path).await?;
        Ok(self.runner.run_spec(spec, &path).await?)
    }

    /// Run the batch command `command_id` in every tracked repository
    pub async fn run_on_all(&self, command_id: &str) -> ServiceResult<Vec<RepoOutcome>> {
        let spec = self.command(CommandMode::AllRepos, command_id)?;
        let paths = self.repositories.lock().await.paths();
        log::info!("running {} in {} repositories", spec.id, paths.len());
        Ok(self.runner.run_all(spec, &paths, self.config.jobs).await)
    }

    /// Garbage-collect a repository when its loose objects exceed the threshold
    pub async fn run_maintenance(&self, repo_path: &Path) -> ServiceResult<Outcome> {
        let path = self.tracked(repo_path).await?;
        let (probe, action, gate) = housekeeping(
            &self.config.vcs_executable,
            &path,
            self.config.maintenance_threshold_kb,
        );
        Ok(self
            .runner
            .run_gated(&probe, &action, ExecKind::Capture, gate)
            .await?)
    }

    /// Files of a tracked repository matching the configured file patterns,
    /// relative to the repository and sorted
    pub async fn list_files(&self, repo_path: &Path) -> ServiceResult<Vec<PathBuf>> {
        let path = self.tracked(repo_path).await?;
        Ok(matching_files(&path, &self.config.file_patterns))
    }

    /// Configured commands, interactive first
    pub fn list_commands(&self) -> Vec<&CommandSpec> {
        self.config.commands.iter().collect()
    }

    fn command(&self, mode: CommandMode, id: &str) -> Result<&CommandSpec, CommandError> {
        self.config
            .commands
            .get(mode, id)
            .ok_or_else(|| CommandError::unknown_command(mode, id))
    }

    async fn tracked(&self, path: &Path) -> Result<PathBuf, StoreError> {
        tracked_path(&*self.repositories.lock().await, path)
    }
}

/// The tracked path for `path`, trying its canonical form when it is not tracked
/// as written
fn tracked_path(set: &RepositorySet, path: &Path) -> Result<PathBuf, StoreError> {
    if set.contains(path) {
        return Ok(path.to_path_buf());
    }
    match std::fs::canonicalize(path) {
        Ok(canonical) if set.contains(&canonical) => Ok(canonical),
        _ => Err(StoreError::unknown_repository(path)),
    }
}

fn matching_files(repo_path: &Path, patterns: &[String]) -> Vec<PathBuf> {
    let options = glob::MatchOptions {
        case_sensitive: !cfg!(windows),
        require_literal_separator: true,
        require_literal_leading_dot: false,
    };
    let base = glob::Pattern::escape(&repo_path.to_string_lossy());

    let mut files: Vec<PathBuf> = patterns
        .iter()
        .filter_map(|pattern| {
            let full = format!("{}/{}", base, pattern);
            match glob::glob_with(&full, options) {
                Ok(paths) => Some(paths),
                Err(e) => {
                    log::warn!("invalid file pattern '{}': {}", pattern, e);
                    None
                }
            }
        })
        .flatten()
        .filter_map(Result::ok)
        .filter(|path| path.is_file())
        .filter_map(|path| path.strip_prefix(repo_path).ok().map(Path::to_path_buf))
        .filter(|relative| {
            !relative
                .components()
                .any(|c| c.as_os_str() == VCS_MARKER)
        })
        .collect();
    files.sort();
    files.dedup();
    files
}
