//! Application startup
//!
//! Parses arguments, starts logging, loads the configuration snapshot, checks the
//! version-control executable and dispatches the subcommand.

use crate::app::cli::config::load_config;
use crate::app::cli::{Args, Command};
use crate::app::display;
use crate::app::error::ServiceResult;
use crate::app::service::RepoService;
use crate::core::config::check_vcs_executable;
use crate::core::error_handling::log_error_with_context;
use crate::core::logging::{init_logging, parse_log_file, reconfigure_log_level, LogFormat, LogSettings};
use std::process::ExitCode;
use std::str::FromStr;

pub async fn startup() -> ExitCode {
    let args = Args::parse_styled();
    let color = args.use_color();
    colored::control::set_override(color);

    let settings = LogSettings {
        level: args.log_level.clone().unwrap_or_else(|| "info".to_string()),
        format: args
            .log_format
            .as_deref()
            .and_then(|f| LogFormat::from_str(f).ok())
            .unwrap_or_default(),
        file: args.log_file.as_deref().and_then(parse_log_file),
        color,
    };
    if let Err(e) = init_logging(&settings) {
        eprintln!("Failed to initialise logging: {}", e);
        return ExitCode::FAILURE;
    }
    log::debug!("repotrack {}", crate::core::version::long_version());

    let config = match load_config(args.config_file.as_deref()).await {
        Ok(config) => config,
        Err(e) => {
            log_error_with_context(&e, "Configuration loading");
            return ExitCode::FAILURE;
        }
    };

    // the command line wins over the configuration file
    if args.log_level.is_none() {
        if let Some(level) = config.log_level.as_deref() {
            if let Err(e) = reconfigure_log_level(level) {
                log::warn!("Could not apply log-level '{}': {}", level, e);
            }
        }
    }

    if let Err(e) = check_vcs_executable(&config.vcs_executable) {
        log_error_with_context(&e, "Configuration check");
        return ExitCode::FAILURE;
    }

    match run(&args.command, config, color).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            log_error_with_context(&e, "Command execution");
            ExitCode::FAILURE
        }
    }
}

/// Dispatch one subcommand; `Ok(false)` when it ran but reported a failure
async fn run(
    command: &Command,
    config: crate::core::config::ConfigSnapshot,
    color: bool,
) -> ServiceResult<bool> {
    let service = RepoService::open(config).await?;

    match command {
        Command::Scan => {
            let outcome = service.scan().await?;
            println!("{}", display::discover_summary(&outcome, color));
        }
        Command::List { json } => {
            let repositories = service.list_repositories().await;
            if *json {
                println!("{}", to_json(&repositories));
            } else if repositories.is_empty() {
                println!("No repositories tracked");
            } else {
                display::repositories_table(&repositories, color).printstd();
            }
        }
        Command::Rename { path, name } => {
            let renamed = service.rename(path, name).await?;
            println!("{} -> {}", renamed.path.display(), renamed.name);
        }
        Command::Prune => {
            let removed = service.remove_stale().await?;
            println!("{}", display::removed_summary(&removed, color));
        }
        Command::Commands { json } => {
            let commands = service.list_commands();
            if *json {
                println!("{}", to_json(&commands));
            } else if commands.is_empty() {
                println!("No commands configured");
            } else {
                display::commands_table(&commands, color).printstd();
            }
        }
        Command::Run {
            command_id,
            repo_path,
        } => {
            let outcome = service.run_on_one(repo_path, command_id).await?;
            println!("{}", display::outcome_report(&outcome, color));
            return Ok(outcome.is_success());
        }
        Command::RunAll { command_id } => {
            let outcomes = service.run_on_all(command_id).await?;
            println!("{}", display::batch_summary(&outcomes, color));
            return Ok(outcomes.iter().all(|o| o.is_success()));
        }
        Command::Gc { repo_path } => {
            let outcome = service.run_maintenance(repo_path).await?;
            println!("{}", display::outcome_report(&outcome, color));
            return Ok(outcome.is_success());
        }
        Command::Files { repo_path } => {
            let files = service.list_files(repo_path).await?;
            println!("{}", display::files_list(repo_path, &files, color));
        }
    }
    Ok(true)
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| {
        log::error!("Could not serialise output: {}", e);
        String::from("null")
    })
}
