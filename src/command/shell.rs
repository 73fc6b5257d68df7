//! Shell command lines for configured commands
//!
//! Configured argument strings are shell text written by the user, so they are
//! handed to the platform shell verbatim after the quoted executable.

use crate::command::launcher::Invocation;
use crate::command::spec::RenderedCommand;

#[cfg(not(windows))]
const SHELL: (&str, &str) = ("sh", "-c");
#[cfg(windows)]
const SHELL: (&str, &str) = ("cmd", "/C");

/// `<quoted executable> <args>` for the platform shell
pub fn shell_command_line(executable: &str, args: &str) -> String {
    let args = args.trim();
    if args.is_empty() {
        shell_quote(executable)
    } else {
        format!("{} {}", shell_quote(executable), args)
    }
}

/// Wrap a rendered command in a shell invocation
pub fn shell_invocation(rendered: &RenderedCommand) -> Invocation {
    let (shell, flag) = SHELL;
    let invocation = Invocation::new(shell)
        .arg(flag)
        .arg(&shell_command_line(&rendered.executable, &rendered.args));
    match &rendered.working_dir {
        Some(dir) => invocation.current_dir(dir),
        None => invocation,
    }
}

pub fn shell_join(args: &[String]) -> String {
    args.iter()
        .map(|arg| shell_quote(arg))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(not(windows))]
pub fn shell_quote(value: &str) -> String {
    if value.is_empty() {
        return "''".to_string();
    }
    if value
        .chars()
        .all(|ch| ch.is_ascii_alphanumeric() || "@%_+=:,./-".contains(ch))
    {
        return value.to_string();
    }
    format!("'{}'", value.replace('\'', "'\"'\"'"))
}

#[cfg(windows)]
pub fn shell_quote(value: &str) -> String {
    if !value.is_empty() && !value.contains([' ', '\t', '"', '&', '|', '<', '>', '^']) {
        return value.to_string();
    }
    format!("\"{}\"", value.replace('"', "\"\""))
}
