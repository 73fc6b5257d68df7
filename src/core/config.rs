//! Configuration snapshot
//!
//! The TOML configuration file is parsed into raw serde structures, validated and
//! turned into an immutable [`ConfigSnapshot`]. Reloading builds a new snapshot;
//! nothing is ever mutated in place.
//!
//! ```toml
//! git-exe = "/usr/bin/git"
//! jobs = 4
//!
//! [scan-path.work]
//! paths = ["~/work"]
//! depth = 3
//! excludes = ["node_modules", ".*"]
//!
//! [cmd.status]
//! cmd = "{git_exe}"
//! args = "-C \"{repo_path}\" status"
//! exec = "capture"
//!
//! [cmd-all.fetch]
//! cmd = "{git_exe}"
//! args = "fetch --all"
//! exec = "capture"
//! ```

use crate::command::maintenance::DEFAULT_MAINTENANCE_THRESHOLD_KB;
use crate::command::spec::{CommandCatalog, CommandMode, CommandSpec, ExecKind, ProbeSpec};
use crate::command::template::{self, CommandTemplate};
use crate::core::validation::{
    validate_glob_pattern, validate_non_empty, validate_positive_int, ValidationError,
};
use crate::repository::store::STORE_FILE_NAME;
use crate::scanner::discovery::DEFAULT_JOBS;
use crate::scanner::filter::PathFilter;
use crate::scanner::types::ScanRoot;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Directory name below the platform configuration directory
pub const CONFIG_DIR_NAME: &str = "Repotrack";
pub const CONFIG_FILE_NAME: &str = "repotrack.toml";

pub const DEFAULT_VCS_EXECUTABLE: &str = "git";
pub const DEFAULT_COMMAND_TIMEOUT_SECS: u64 = 300;
pub const DEFAULT_RESOLVE_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Cannot read configuration file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{message}")]
    Parse { path: PathBuf, message: String },

    #[error("{0}")]
    Invalid(#[from] ValidationError),

    #[error("{message}")]
    ExecutableNotFound { executable: String, message: String },
}

impl crate::core::error_handling::ContextualError for ConfigError {
    fn is_user_actionable(&self) -> bool {
        !matches!(self, ConfigError::Read { .. })
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            ConfigError::Read { .. } => None,
            ConfigError::Parse { message, .. } => Some(message),
            ConfigError::Invalid(e) => Some(e.message()),
            ConfigError::ExecutableNotFound { message, .. } => Some(message),
        }
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Immutable configuration for one run
#[derive(Debug, Clone)]
pub struct ConfigSnapshot {
    pub vcs_executable: String,
    pub scan_roots: Vec<ScanRoot>,
    pub commands: CommandCatalog,
    pub file_patterns: Vec<String>,
    pub store_path: PathBuf,
    /// Bound on concurrent resolver processes and batch repositories
    pub jobs: usize,
    pub command_timeout: Duration,
    pub resolve_timeout: Duration,
    pub maintenance_threshold_kb: u64,
    pub log_level: Option<String>,
}

impl Default for ConfigSnapshot {
    fn default() -> Self {
        Self {
            vcs_executable: DEFAULT_VCS_EXECUTABLE.to_string(),
            scan_roots: Vec::new(),
            commands: CommandCatalog::new(),
            file_patterns: Vec::new(),
            store_path: default_store_path(),
            jobs: DEFAULT_JOBS,
            command_timeout: Duration::from_secs(DEFAULT_COMMAND_TIMEOUT_SECS),
            resolve_timeout: Duration::from_secs(DEFAULT_RESOLVE_TIMEOUT_SECS),
            maintenance_threshold_kb: DEFAULT_MAINTENANCE_THRESHOLD_KB,
            log_level: None,
        }
    }
}

/// `<config dir>/Repotrack`, or the working directory when the platform has none
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join(CONFIG_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from("."))
}

pub fn default_config_file() -> PathBuf {
    default_config_dir().join(CONFIG_FILE_NAME)
}

pub fn default_store_path() -> PathBuf {
    default_config_dir().join(STORE_FILE_NAME)
}

/// Expand a leading `~/` to the home directory
pub fn expand_home(path: &str) -> PathBuf {
    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    if let Some(rest) = path.strip_prefix("~/").or_else(|| path.strip_prefix("~\\")) {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct RawConfig {
    git_exe: Option<String>,
    jobs: Option<i64>,
    command_timeout: Option<i64>,
    resolve_timeout: Option<i64>,
    maintenance_threshold_kb: Option<u64>,
    store_file: Option<String>,
    #[serde(default)]
    file_patterns: OneOrMany,
    log_level: Option<String>,
    #[serde(default)]
    scan_path: BTreeMap<String, RawScanPath>,
    #[serde(default)]
    cmd: BTreeMap<String, RawCommand>,
    #[serde(default)]
    cmd_all: BTreeMap<String, RawCommand>,
}

/// A single string or a list of strings
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl Default for OneOrMany {
    fn default() -> Self {
        OneOrMany::Many(Vec::new())
    }
}

impl OneOrMany {
    fn into_vec(self) -> Vec<String> {
        let items = match self {
            OneOrMany::One(s) => vec![s],
            OneOrMany::Many(v) => v,
        };
        items
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct RawScanPath {
    #[serde(default)]
    paths: OneOrMany,
    /// Negative means unbounded
    depth: Option<i64>,
    #[serde(default)]
    excludes: OneOrMany,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct RawCommand {
    cmd: Option<String>,
    label: Option<String>,
    args: Option<String>,
    cwd: Option<String>,
    exec: Option<String>,
    probe: Option<RawProbe>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct RawProbe {
    args: String,
    token: usize,
    threshold: u64,
}

impl ConfigSnapshot {
    /// Read and validate the configuration file at `path`
    pub async fn load(path: &Path) -> ConfigResult<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        let snapshot = Self::from_toml_str(&content, path)?;
        log::debug!(
            "loaded {} scan roots and {} commands from {}",
            snapshot.scan_roots.len(),
            snapshot.commands.len(),
            path.display()
        );
        Ok(snapshot)
    }

    /// Parse configuration text; `origin` names the file in error messages
    pub fn from_toml_str(content: &str, origin: &Path) -> ConfigResult<Self> {
        let raw: RawConfig = toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: origin.to_path_buf(),
            message: format!("Error parsing configuration file {}: {}", origin.display(), e),
        })?;
        Ok(Self::from_raw(raw)?)
    }

    fn from_raw(raw: RawConfig) -> Result<Self, ValidationError> {
        let defaults = Self::default();

        let vcs_executable = match raw.git_exe.as_deref() {
            Some(exe) => validate_non_empty(Some(exe), "git-exe")?.to_string(),
            None => defaults.vcs_executable,
        };

        let jobs = match raw.jobs {
            Some(jobs) => validate_positive_int(jobs, "jobs")?,
            None => defaults.jobs,
        };
        let command_timeout = seconds(raw.command_timeout, "command-timeout")?
            .unwrap_or(defaults.command_timeout);
        let resolve_timeout = seconds(raw.resolve_timeout, "resolve-timeout")?
            .unwrap_or(defaults.resolve_timeout);

        let store_path = raw
            .store_file
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(expand_home)
            .unwrap_or(defaults.store_path);

        let file_patterns = raw
            .file_patterns
            .into_vec()
            .iter()
            .map(|p| validate_glob_pattern(p))
            .collect::<Result<Vec<_>, _>>()?;

        let scan_roots = raw
            .scan_path
            .into_iter()
            .map(|(label, section)| scan_root(&label, section))
            .collect::<Result<Vec<_>, _>>()?;

        let mut commands = CommandCatalog::new();
        for (mode, table) in [
            (CommandMode::Interactive, raw.cmd),
            (CommandMode::AllRepos, raw.cmd_all),
        ] {
            for (id, section) in table {
                if let Some(spec) = command_spec(&id, section, mode, &vcs_executable)? {
                    commands.insert(spec)?;
                }
            }
        }

        if let Some(level) = raw.log_level.as_deref() {
            if log::LevelFilter::from_str(level.trim()).is_err() {
                return Err(ValidationError::new(&format!(
                    "Invalid log-level '{}'",
                    level
                )));
            }
        }

        Ok(Self {
            vcs_executable,
            scan_roots,
            commands,
            file_patterns,
            store_path,
            jobs,
            command_timeout,
            resolve_timeout,
            maintenance_threshold_kb: raw
                .maintenance_threshold_kb
                .unwrap_or(defaults.maintenance_threshold_kb),
            log_level: raw.log_level.map(|l| l.trim().to_string()),
        })
    }
}

fn seconds(value: Option<i64>, field: &str) -> Result<Option<Duration>, ValidationError> {
    value
        .map(|v| validate_positive_int(v, field).map(|secs| Duration::from_secs(secs as u64)))
        .transpose()
}

fn section_name(mode: CommandMode) -> &'static str {
    match mode {
        CommandMode::Interactive => "cmd",
        CommandMode::AllRepos => "cmd-all",
    }
}

fn scan_root(label: &str, section: RawScanPath) -> Result<ScanRoot, ValidationError> {
    let paths: Vec<PathBuf> = section
        .paths
        .into_vec()
        .iter()
        .map(|p| expand_home(p))
        .collect();
    if paths.is_empty() {
        return Err(ValidationError::new(&format!(
            "scan-path.{} has no 'paths'",
            label
        )));
    }

    let max_depth = section
        .depth
        .and_then(|depth| usize::try_from(depth).ok());

    let excludes = PathFilter::new(&section.excludes.into_vec()).map_err(|e| {
        ValidationError::new(&format!("scan-path.{}: {}", label, e.message()))
    })?;

    Ok(ScanRoot::new(label, paths)
        .with_max_depth(max_depth)
        .with_excludes(excludes))
}

/// Build one command spec; `Ok(None)` when the command is skipped
fn command_spec(
    id: &str,
    section: RawCommand,
    mode: CommandMode,
    vcs_executable: &str,
) -> Result<Option<CommandSpec>, ValidationError> {
    let prefix = format!("{}.{}", section_name(mode), id);

    let executable = validate_non_empty(section.cmd.as_deref(), &format!("{}.cmd", prefix))?;
    template::validate_placeholders(
        executable,
        &[template::TOOL_PATH_PLACEHOLDER],
        &format!("{}.cmd", prefix),
    )?;
    let executable = template::substitute_tool_path(executable, vcs_executable);

    let executable_path = Path::new(&executable);
    if executable_path.is_absolute() && !executable_path.exists() {
        log::warn!(
            "{}: {} does not exist, command skipped",
            prefix,
            executable_path.display()
        );
        return Ok(None);
    }

    let mut spec = CommandSpec::new(id, &executable, mode);
    if let Some(label) = section.label.as_deref().map(str::trim).filter(|l| !l.is_empty()) {
        spec = spec.with_label(label);
    }
    if let Some(args) = section.args.as_deref() {
        spec = spec.with_args(CommandTemplate::parse(args, &format!("{}.args", prefix))?);
    }
    if let Some(cwd) = section.cwd.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
        if mode == CommandMode::AllRepos {
            return Err(ValidationError::new(&format!(
                "{} cannot set 'cwd'; batch commands run inside each repository",
                prefix
            )));
        }
        spec = spec.with_working_dir(CommandTemplate::parse(cwd, &format!("{}.cwd", prefix))?);
    }
    if let Some(exec) = section.exec.as_deref() {
        let kind = ExecKind::from_str(exec.trim()).map_err(|_| {
            ValidationError::new(&format!(
                "Invalid {}.exec '{}' (expected capture or detached)",
                prefix, exec
            ))
        })?;
        spec = spec.with_exec_kind(kind);
    }
    if let Some(probe) = section.probe {
        spec = spec.with_probe(ProbeSpec {
            args: CommandTemplate::parse(&probe.args, &format!("{}.probe.args", prefix))?,
            token: probe.token,
            threshold: probe.threshold,
        });
    }

    Ok(Some(spec))
}

/// Locate the version-control executable: an absolute path must be an existing
/// file, anything else is looked up on `PATH`
pub fn check_vcs_executable(executable: &str) -> ConfigResult<PathBuf> {
    let path = Path::new(executable);
    if path.is_absolute() {
        if path.is_file() {
            return Ok(path.to_path_buf());
        }
        return Err(ConfigError::ExecutableNotFound {
            executable: executable.to_string(),
            message: format!("git executable not found at {}", executable),
        });
    }
    which::which(executable).map_err(|e| ConfigError::ExecutableNotFound {
        executable: executable.to_string(),
        message: format!("git executable '{}' not found on PATH: {}", executable, e),
    })
}
