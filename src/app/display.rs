//! Output formatting for the command-line front end
//!
//! Tables are built with prettytable and coloured through cell style specs, so the
//! caller decides whether they go to a terminal. Everything else is returned as
//! plain strings painted with [`StyleRole`].

use crate::app::service::DiscoverOutcome;
use crate::command::runner::{Outcome, RepoOutcome};
use crate::command::spec::CommandSpec;
use crate::core::styles::StyleRole;
use crate::repository::types::Repository;
use prettytable::{format, Cell, Row, Table};
use std::path::{Path, PathBuf};

fn cell(text: &str, role: StyleRole, color: bool) -> Cell {
    let cell = Cell::new(text);
    match role.to_prettytable_spec().filter(|_| color) {
        Some(spec) => cell.style_spec(&spec),
        None => cell,
    }
}

fn table_with_titles(titles: &[&str], color: bool) -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_CLEAN);
    table.set_titles(Row::new(
        titles
            .iter()
            .map(|t| cell(t, StyleRole::Header, color))
            .collect(),
    ));
    table
}

pub fn repositories_table(repositories: &[Repository], color: bool) -> Table {
    let mut table = table_with_titles(&["Name", "Path"], color);
    for repository in repositories {
        table.add_row(Row::new(vec![
            cell(&repository.name, StyleRole::Name, color),
            cell(&repository.path.display().to_string(), StyleRole::Path, color),
        ]));
    }
    table
}

pub fn commands_table(commands: &[&CommandSpec], color: bool) -> Table {
    let mut table = table_with_titles(&["Id", "Mode", "Exec", "Label", "Command"], color);
    for spec in commands {
        let command_line = if spec.args.is_empty() {
            spec.executable.clone()
        } else {
            format!("{} {}", spec.executable, spec.args)
        };
        table.add_row(Row::new(vec![
            cell(&spec.id, StyleRole::Name, color),
            cell(&spec.mode.to_string(), StyleRole::Dim, color),
            cell(&spec.exec_kind.to_string(), StyleRole::Dim, color),
            cell(&spec.label, StyleRole::Label, color),
            cell(&command_line, StyleRole::Label, color),
        ]));
    }
    table
}

/// Added and removed repositories followed by the total
pub fn discover_summary(outcome: &DiscoverOutcome, color: bool) -> String {
    let mut lines = Vec::new();
    for repository in &outcome.added {
        lines.push(format!(
            "{} {} {}",
            StyleRole::Success.paint("+", color),
            StyleRole::Name.paint(&repository.name, color),
            StyleRole::Path.paint(&repository.path.display().to_string(), color)
        ));
    }
    for repository in &outcome.removed {
        lines.push(format!(
            "{} {} {}",
            StyleRole::Failure.paint("-", color),
            StyleRole::Name.paint(&repository.name, color),
            StyleRole::Path.paint(&repository.path.display().to_string(), color)
        ));
    }
    for dir in &outcome.report.incomplete {
        lines.push(StyleRole::Skipped.paint(
            &format!(
                "! resolution failed below {}, tracked repositories there were kept",
                dir.display()
            ),
            color,
        ));
    }
    lines.push(format!(
        "{} repositories found, {} added, {} removed",
        outcome.report.repositories.len(),
        outcome.added.len(),
        outcome.removed.len()
    ));
    lines.join("\n")
}

/// Removed repositories, one per line
pub fn removed_summary(removed: &[Repository], color: bool) -> String {
    if removed.is_empty() {
        return "Nothing to remove".to_string();
    }
    removed
        .iter()
        .map(|r| {
            format!(
                "{} {} {}",
                StyleRole::Failure.paint("-", color),
                StyleRole::Name.paint(&r.name, color),
                StyleRole::Path.paint(&r.path.display().to_string(), color)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// One-line status of an outcome
pub fn describe_outcome(outcome: &Outcome, color: bool) -> String {
    match outcome {
        Outcome::Captured(output) if output.success() => StyleRole::Success.paint("ok", color),
        Outcome::Captured(output) => StyleRole::Failure.paint(
            &match output.exit_code {
                Some(code) => format!("exit {}: {}", code, output.first_error_line()),
                None => format!("terminated: {}", output.first_error_line()),
            },
            color,
        ),
        Outcome::Detached => StyleRole::Success.paint("started", color),
        Outcome::NotFound { working_dir } => StyleRole::Failure.paint(
            &format!("{} does not exist", working_dir.display()),
            color,
        ),
        Outcome::Skipped(reason) => {
            StyleRole::Skipped.paint(&format!("skipped: {}", reason), color)
        }
    }
}

/// Captured output followed by the status line
pub fn outcome_report(outcome: &Outcome, color: bool) -> String {
    let mut text = String::new();
    if let Outcome::Captured(output) = outcome {
        text.push_str(&output.stdout);
        if !output.success() {
            text.push_str(&output.stderr);
        }
        if !text.is_empty() && !text.ends_with('\n') {
            text.push('\n');
        }
    }
    text.push_str(&describe_outcome(outcome, color));
    text
}

pub fn batch_summary(outcomes: &[RepoOutcome], color: bool) -> String {
    let mut lines: Vec<String> = outcomes
        .iter()
        .map(|o| {
            let status = match &o.result {
                Ok(outcome) => describe_outcome(outcome, color),
                Err(e) => StyleRole::Failure.paint(&e.to_string(), color),
            };
            format!(
                "{}: {}",
                StyleRole::Path.paint(&o.repository.display().to_string(), color),
                status
            )
        })
        .collect();
    let failed = outcomes.iter().filter(|o| !o.is_success()).count();
    lines.push(format!(
        "{} repositories, {} failed",
        outcomes.len(),
        failed
    ));
    lines.join("\n")
}

pub fn files_list(repo_path: &Path, files: &[PathBuf], color: bool) -> String {
    if files.is_empty() {
        return format!(
            "No matching files in {}",
            StyleRole::Path.paint(&repo_path.display().to_string(), color)
        );
    }
    files
        .iter()
        .map(|f| f.display().to_string())
        .collect::<Vec<_>>()
        .join("\n")
}
