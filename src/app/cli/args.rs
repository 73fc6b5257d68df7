//! Command-line arguments
//!
//! Global options configure logging, colour and the configuration file; the
//! subcommand selects the operation.

use crate::core::styles::palette_to_clap;
use clap::{CommandFactory, FromArgMatches, Parser, Subcommand};
use std::ffi::OsString;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "repotrack")]
#[command(about = "Track git repositories and run configured commands against them")]
#[command(version = crate::core::version::long_version())]
pub struct Args {
    /// Configuration file path
    #[arg(short = 'c', long = "config-file", value_name = "FILE", global = true)]
    pub config_file: Option<PathBuf>,

    /// Log level
    #[arg(
        short = 'l',
        long = "log-level",
        value_name = "LEVEL",
        global = true,
        value_parser = ["trace", "debug", "info", "warn", "error", "off"]
    )]
    pub log_level: Option<String>,

    /// Log output format
    #[arg(
        short = 'o',
        long = "log-format",
        value_name = "FORMAT",
        global = true,
        value_parser = ["text", "ext", "json"]
    )]
    pub log_format: Option<String>,

    /// Log file path (use 'none' to disable file logging)
    #[arg(short = 'f', long = "log-file", value_name = "FILE", global = true)]
    pub log_file: Option<String>,

    /// Force coloured output
    #[arg(long = "color", global = true, conflicts_with = "no_color")]
    pub color: bool,

    /// Disable coloured output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Rescan all configured roots and update the repository list
    Scan,

    /// List tracked repositories
    List {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Change the display name of a tracked repository
    Rename {
        #[arg(value_name = "PATH")]
        path: PathBuf,
        #[arg(value_name = "NAME")]
        name: String,
    },

    /// Drop repositories whose directory no longer exists
    Prune,

    /// List configured commands
    Commands {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Run a configured command against one repository
    Run {
        #[arg(value_name = "COMMAND_ID")]
        command_id: String,
        #[arg(value_name = "REPO_PATH")]
        repo_path: PathBuf,
    },

    /// Run a configured batch command in every repository
    RunAll {
        #[arg(value_name = "COMMAND_ID")]
        command_id: String,
    },

    /// Garbage-collect a repository when it has enough loose objects
    Gc {
        #[arg(value_name = "REPO_PATH")]
        repo_path: PathBuf,
    },

    /// List files of a repository matching the configured file patterns
    Files {
        #[arg(value_name = "REPO_PATH")]
        repo_path: PathBuf,
    },
}

impl Args {
    /// Colour setting from the flags: `None` means detect from the terminal
    pub fn color_choice(&self) -> Option<bool> {
        match (self.color, self.no_color) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }

    /// Resolve the colour setting against the terminal state
    pub fn use_color(&self) -> bool {
        self.color_choice()
            .unwrap_or_else(|| std::io::IsTerminal::is_terminal(&std::io::stdout()))
    }

    /// Parse the process arguments with help output styled to match the terminal
    pub fn parse_styled() -> Self {
        let raw: Vec<OsString> = std::env::args_os().collect();
        let styles = palette_to_clap(help_color(&raw));
        let matches = Self::command().styles(styles).get_matches_from(raw);
        Self::from_arg_matches(&matches).unwrap_or_else(|e| e.exit())
    }
}

/// Colour for help and usage errors, decided before the arguments are parsed
pub(crate) fn help_color(raw: &[OsString]) -> bool {
    if raw.iter().any(|a| a == "--no-color") {
        return false;
    }
    raw.iter().any(|a| a == "--color") || std::io::IsTerminal::is_terminal(&std::io::stdout())
}
