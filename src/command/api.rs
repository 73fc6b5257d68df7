//! Command API
//!
//! Public exports of the command system.

pub use crate::command::error::{CommandError, CommandResult};
pub use crate::command::launcher::{
    CapturedOutput, Invocation, Launcher, SystemLauncher, DEFAULT_COMMAND_TIMEOUT,
};
pub use crate::command::maintenance::{
    housekeeping, parse_probe_value, Gate, SkipReason, DEFAULT_MAINTENANCE_THRESHOLD_KB,
};
pub use crate::command::runner::{CommandRunner, Outcome, RepoOutcome};
pub use crate::command::spec::{
    CommandCatalog, CommandMode, CommandSpec, ExecKind, ProbeSpec, RenderedCommand,
};
pub use crate::command::template::{CommandTemplate, TemplateVars};
