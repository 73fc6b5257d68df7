//! Command Template
//!
//! Argument and working-directory templates for configured commands. The only
//! placeholder known at render time is `{repo_path}`; `{git_exe}` may appear in the
//! executable and is substituted once when the configuration is loaded.
//!
//! Rendering is a literal substitution. Nothing is quoted or escaped, so a template
//! that must survive paths with spaces quotes the placeholder itself:
//! `args = "-C \"{repo_path}\" status"`.

use crate::core::validation::ValidationError;
use std::fmt;
use std::path::Path;

/// Placeholder replaced by the repository path at render time
pub const REPO_PATH_PLACEHOLDER: &str = "{repo_path}";

/// Placeholder replaced by the configured VCS executable at load time
pub const TOOL_PATH_PLACEHOLDER: &str = "{git_exe}";

/// Values available to a template at render time
#[derive(Debug, Clone)]
pub struct TemplateVars {
    pub repo_path: String,
}

impl TemplateVars {
    pub fn for_repository(repo_path: &Path) -> Self {
        Self {
            repo_path: repo_path.to_string_lossy().into_owned(),
        }
    }
}

/// A validated template string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTemplate {
    template: String,
}

impl CommandTemplate {
    /// Validate `template` for use at render time.
    ///
    /// `field` names the configuration key for error messages.
    pub fn parse(template: &str, field: &str) -> Result<Self, ValidationError> {
        validate_placeholders(template, &[REPO_PATH_PLACEHOLDER], field)?;
        Ok(Self {
            template: template.to_string(),
        })
    }

    /// Wrap a built-in template that is known to be valid
    pub(crate) fn trusted(template: &str) -> Self {
        Self {
            template: template.to_string(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.template
    }

    pub fn is_empty(&self) -> bool {
        self.template.trim().is_empty()
    }

    pub fn render(&self, vars: &TemplateVars) -> String {
        render(&self.template, vars)
    }
}

impl fmt::Display for CommandTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.template)
    }
}

/// Substitute every `{repo_path}` occurrence, leaving all other text untouched
pub fn render(template: &str, vars: &TemplateVars) -> String {
    template.replace(REPO_PATH_PLACEHOLDER, &vars.repo_path)
}

/// Substitute the VCS executable into an executable template
pub fn substitute_tool_path(executable: &str, vcs_executable: &str) -> String {
    executable.replace(TOOL_PATH_PLACEHOLDER, vcs_executable)
}

/// Every `{identifier}` token in `template`, in order of appearance.
///
/// Braces that do not enclose a plain identifier (`{}`, `{a b}`) and shell
/// expansions such as `${HOME}` are ordinary template text.
pub fn placeholders(template: &str) -> Vec<&str> {
    let mut found = Vec::new();
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        let after = &rest[start + 1..];
        let ident_len = after
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(after.len());
        let shell_expansion = rest[..start].ends_with('$');
        if ident_len > 0 && after[ident_len..].starts_with('}') && !shell_expansion {
            found.push(&rest[start..start + ident_len + 2]);
            rest = &after[ident_len + 1..];
        } else {
            rest = after;
        }
    }
    found
}

/// Reject placeholders outside `allowed`
pub fn validate_placeholders(
    template: &str,
    allowed: &[&str],
    field: &str,
) -> Result<(), ValidationError> {
    for placeholder in placeholders(template) {
        if !allowed.contains(&placeholder) {
            return Err(ValidationError::new(&format!(
                "Unknown placeholder '{}' in {} (supported: {})",
                placeholder,
                field,
                allowed.join(", ")
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn vars(path: &str) -> TemplateVars {
        TemplateVars::for_repository(&PathBuf::from(path))
    }

    #[test]
    fn test_render_replaces_every_occurrence() {
        let template = CommandTemplate::parse("-C {repo_path} log -- {repo_path}", "cmd.log.args")
            .unwrap();
        assert_eq!(
            template.render(&vars("/work/a")),
            "-C /work/a log -- /work/a"
        );
    }

    #[test]
    fn test_render_does_not_quote() {
        let template = CommandTemplate::parse("\"{repo_path}\"", "cmd.open.args").unwrap();
        assert_eq!(
            template.render(&vars("/work/my repo")),
            "\"/work/my repo\""
        );

        let bare = CommandTemplate::parse("{repo_path}", "cmd.open.args").unwrap();
        assert_eq!(bare.render(&vars("/work/my repo")), "/work/my repo");
    }

    #[test]
    fn test_render_leaves_other_text_untouched() {
        let template =
            CommandTemplate::parse("log --format={} ${HOME} {repo_path", "cmd.log.args").unwrap();
        assert_eq!(
            template.render(&vars("/x")),
            "log --format={} ${HOME} {repo_path"
        );
    }

    #[test]
    fn test_unknown_placeholder_rejected_at_parse() {
        let err = CommandTemplate::parse("{repo_name}", "cmd.x.args").unwrap_err();
        assert!(err.message().contains("'{repo_name}'"));
        assert!(err.message().contains("cmd.x.args"));

        // the tool path is only valid in executables
        assert!(CommandTemplate::parse("{git_exe} status", "cmd.x.args").is_err());
    }

    #[test]
    fn test_placeholders_scanning() {
        assert_eq!(
            placeholders("{git_exe} -C {repo_path} {} {a-b} ${HOME} {_x1}"),
            vec!["{git_exe}", "{repo_path}", "{_x1}"]
        );
        assert!(placeholders("no braces").is_empty());
        assert!(placeholders("{unterminated").is_empty());
    }

    #[test]
    fn test_substitute_tool_path() {
        assert_eq!(
            substitute_tool_path("{git_exe}", "/usr/bin/git"),
            "/usr/bin/git"
        );
        assert_eq!(substitute_tool_path("gitk", "/usr/bin/git"), "gitk");
    }
}
