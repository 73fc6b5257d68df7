//! Command specifications and the id lookup table
//!
//! Specs are immutable once the configuration is loaded. Callers carry a command id
//! and resolve it through [`CommandCatalog`] whenever the command is executed.

use crate::command::template::{CommandTemplate, TemplateVars};
use crate::core::validation::ValidationError;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use strum_macros::{Display, EnumString};

/// Which repositories a command targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Display, EnumString)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum CommandMode {
    /// Run against one selected repository
    Interactive,
    /// Run once per tracked repository
    AllRepos,
}

/// How a command is executed
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Display, EnumString,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum ExecKind {
    /// Block, collect stdout/stderr and the exit code
    Capture,
    /// Hand off to the OS and return immediately
    #[default]
    Detached,
}

/// A cheap capture-mode check that gates a command
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeSpec {
    /// Arguments passed to the command's executable for the probe
    #[serde(serialize_with = "serialize_template")]
    pub args: CommandTemplate,
    /// 0-based whitespace token of the probe's stdout holding the value
    pub token: usize,
    /// The command only runs when the value is strictly greater than this
    pub threshold: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandSpec {
    pub id: String,
    pub executable: String,
    pub label: String,
    #[serde(serialize_with = "serialize_template")]
    pub args: CommandTemplate,
    #[serde(serialize_with = "serialize_optional_template")]
    pub working_dir: Option<CommandTemplate>,
    pub mode: CommandMode,
    pub exec_kind: ExecKind,
    pub probe: Option<ProbeSpec>,
}

/// A spec rendered for one repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedCommand {
    pub executable: String,
    pub args: String,
    pub working_dir: Option<PathBuf>,
    pub exec_kind: ExecKind,
}

impl CommandSpec {
    /// Create a spec with the defaults used for configured commands: label equal to
    /// the id, detached execution and, for interactive commands, `"{repo_path}"` as
    /// the arguments.
    pub fn new(id: &str, executable: &str, mode: CommandMode) -> Self {
        let default_args = match mode {
            CommandMode::Interactive => "\"{repo_path}\"",
            CommandMode::AllRepos => "",
        };
        Self {
            id: id.to_string(),
            executable: executable.to_string(),
            label: id.to_string(),
            args: CommandTemplate::trusted(default_args),
            working_dir: None,
            mode,
            exec_kind: ExecKind::default(),
            probe: None,
        }
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = label.to_string();
        self
    }

    pub fn with_args(mut self, args: CommandTemplate) -> Self {
        self.args = args;
        self
    }

    pub fn with_working_dir(mut self, working_dir: CommandTemplate) -> Self {
        self.working_dir = Some(working_dir);
        self
    }

    pub fn with_exec_kind(mut self, exec_kind: ExecKind) -> Self {
        self.exec_kind = exec_kind;
        self
    }

    pub fn with_probe(mut self, probe: ProbeSpec) -> Self {
        self.probe = Some(probe);
        self
    }

    /// Structural checks that cannot be expressed by the builder
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.executable.trim().is_empty() {
            return Err(ValidationError::new(&format!(
                "Command '{}' has an empty executable",
                self.id
            )));
        }
        if self.mode == CommandMode::AllRepos && self.working_dir.is_some() {
            return Err(ValidationError::new(&format!(
                "Command '{}' runs on all repositories and cannot set a working directory",
                self.id
            )));
        }
        Ok(())
    }

    /// Render arguments and working directory for `repo_path`.
    ///
    /// Batch commands always run inside the repository they target.
    pub fn render(&self, repo_path: &Path) -> RenderedCommand {
        let vars = TemplateVars::for_repository(repo_path);
        let working_dir = match (&self.working_dir, self.mode) {
            (Some(template), _) => Some(PathBuf::from(template.render(&vars))),
            (None, CommandMode::AllRepos) => Some(repo_path.to_path_buf()),
            (None, CommandMode::Interactive) => None,
        };
        RenderedCommand {
            executable: self.executable.clone(),
            args: self.args.render(&vars),
            working_dir,
            exec_kind: self.exec_kind,
        }
    }

    /// Render the probe invocation, if this spec has one
    pub fn render_probe(&self, repo_path: &Path) -> Option<RenderedCommand> {
        let probe = self.probe.as_ref()?;
        let rendered = self.render(repo_path);
        Some(RenderedCommand {
            args: probe.args.render(&TemplateVars::for_repository(repo_path)),
            exec_kind: ExecKind::Capture,
            ..rendered
        })
    }
}

fn serialize_template<S: serde::Serializer>(
    template: &CommandTemplate,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(template.as_str())
}

fn serialize_optional_template<S: serde::Serializer>(
    template: &Option<CommandTemplate>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match template {
        Some(t) => serializer.serialize_some(t.as_str()),
        None => serializer.serialize_none(),
    }
}

/// Lookup table from command id to spec, one namespace per mode
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandCatalog {
    interactive: BTreeMap<String, CommandSpec>,
    all_repos: BTreeMap<String, CommandSpec>,
}

impl CommandCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a spec, rejecting a second spec with the same id and mode
    pub fn insert(&mut self, spec: CommandSpec) -> Result<(), ValidationError> {
        spec.validate()?;
        let table = match spec.mode {
            CommandMode::Interactive => &mut self.interactive,
            CommandMode::AllRepos => &mut self.all_repos,
        };
        if table.contains_key(&spec.id) {
            return Err(ValidationError::new(&format!(
                "Duplicate {} command '{}'",
                spec.mode, spec.id
            )));
        }
        table.insert(spec.id.clone(), spec);
        Ok(())
    }

    pub fn get(&self, mode: CommandMode, id: &str) -> Option<&CommandSpec> {
        match mode {
            CommandMode::Interactive => self.interactive.get(id),
            CommandMode::AllRepos => self.all_repos.get(id),
        }
    }

    /// Interactive specs first, then batch specs, each ordered by id
    pub fn iter(&self) -> impl Iterator<Item = &CommandSpec> {
        self.interactive.values().chain(self.all_repos.values())
    }

    pub fn len(&self) -> usize {
        self.interactive.len() + self.all_repos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn template(s: &str) -> CommandTemplate {
        CommandTemplate::parse(s, "test").unwrap()
    }

    #[test]
    fn test_defaults_follow_mode() {
        let spec = CommandSpec::new("open", "gitk", CommandMode::Interactive);
        assert_eq!(spec.label, "open");
        assert_eq!(spec.args.as_str(), "\"{repo_path}\"");
        assert_eq!(spec.exec_kind, ExecKind::Detached);

        let batch = CommandSpec::new("fetch", "git", CommandMode::AllRepos);
        assert!(batch.args.is_empty());
    }

    #[test]
    fn test_render_interactive_with_working_dir() {
        let spec = CommandSpec::new("status", "git", CommandMode::Interactive)
            .with_args(template("status --short"))
            .with_working_dir(template("{repo_path}"))
            .with_exec_kind(ExecKind::Capture);

        let rendered = spec.render(Path::new("/work/a"));
        assert_eq!(rendered.executable, "git");
        assert_eq!(rendered.args, "status --short");
        assert_eq!(rendered.working_dir, Some(PathBuf::from("/work/a")));
        assert_eq!(rendered.exec_kind, ExecKind::Capture);
    }

    #[test]
    fn test_render_interactive_without_working_dir() {
        let spec = CommandSpec::new("open", "code", CommandMode::Interactive);
        let rendered = spec.render(Path::new("/work/a"));
        assert_eq!(rendered.args, "\"/work/a\"");
        assert_eq!(rendered.working_dir, None);
    }

    #[test]
    fn test_batch_runs_inside_repository() {
        let spec = CommandSpec::new("fetch", "git", CommandMode::AllRepos)
            .with_args(template("fetch --all"));
        let rendered = spec.render(Path::new("/work/b"));
        assert_eq!(rendered.working_dir, Some(PathBuf::from("/work/b")));
    }

    #[test]
    fn test_render_probe_is_capture_in_same_directory() {
        let spec = CommandSpec::new("gc", "git", CommandMode::Interactive)
            .with_args(template("gc"))
            .with_working_dir(template("{repo_path}"))
            .with_probe(ProbeSpec {
                args: template("count-objects"),
                token: 2,
                threshold: 10,
            });
        let probe = spec.render_probe(Path::new("/work/a")).unwrap();
        assert_eq!(probe.args, "count-objects");
        assert_eq!(probe.exec_kind, ExecKind::Capture);
        assert_eq!(probe.working_dir, Some(PathBuf::from("/work/a")));

        let plain = CommandSpec::new("open", "code", CommandMode::Interactive);
        assert!(plain.render_probe(Path::new("/work/a")).is_none());
    }

    #[test]
    fn test_batch_spec_rejects_working_dir() {
        let spec = CommandSpec::new("fetch", "git", CommandMode::AllRepos)
            .with_working_dir(template("{repo_path}"));
        assert!(spec.validate().is_err());
    }

    #[test]
    fn test_catalog_lookup_by_mode_and_id() {
        let mut catalog = CommandCatalog::new();
        catalog
            .insert(CommandSpec::new("status", "git", CommandMode::Interactive))
            .unwrap();
        catalog
            .insert(CommandSpec::new("status", "git", CommandMode::AllRepos))
            .unwrap();

        assert_eq!(catalog.len(), 2);
        assert!(catalog.get(CommandMode::Interactive, "status").is_some());
        assert!(catalog.get(CommandMode::AllRepos, "status").is_some());
        assert!(catalog.get(CommandMode::Interactive, "fetch").is_none());

        let err = catalog
            .insert(CommandSpec::new("status", "git", CommandMode::Interactive))
            .unwrap_err();
        assert!(err.message().contains("Duplicate interactive command 'status'"));
    }

    #[test]
    fn test_exec_kind_parsing() {
        assert_eq!(ExecKind::from_str("capture").unwrap(), ExecKind::Capture);
        assert_eq!(ExecKind::from_str("Detached").unwrap(), ExecKind::Detached);
        assert!(ExecKind::from_str("background").is_err());
        assert_eq!(CommandMode::AllRepos.to_string(), "all-repos");
    }
}
