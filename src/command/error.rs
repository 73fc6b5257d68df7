//! Command Error Types

use crate::command::spec::CommandMode;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("{message}")]
    UnknownCommand { id: String, message: String },

    #[error("Failed to run '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{program}' did not finish within {}s", .timeout.as_secs())]
    Timeout { program: String, timeout: Duration },
}

impl CommandError {
    pub fn unknown_command(mode: CommandMode, id: &str) -> Self {
        CommandError::UnknownCommand {
            id: id.to_string(),
            message: format!("No {} command with id '{}' is configured", mode, id),
        }
    }
}

impl crate::core::error_handling::ContextualError for CommandError {
    fn is_user_actionable(&self) -> bool {
        matches!(self, CommandError::UnknownCommand { .. })
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            CommandError::UnknownCommand { message, .. } => Some(message),
            _ => None,
        }
    }
}

/// Result type for command operations
pub type CommandResult<T> = Result<T, CommandError>;
