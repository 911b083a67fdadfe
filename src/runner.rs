use stacked_errors::Result;

use crate::{Command, CommandResult};

/// Runs the commands of a session. Everything that touches the container
/// runtime goes through here, so sessions can be driven by a scripted runner
/// in tests.
#[allow(async_fn_in_trait)]
pub trait ProcessRunner {
    /// Runs `command` to completion. An `Err` means the process could not be
    /// run at all, an unsuccessful exit is reported in the `CommandResult`.
    async fn run(&mut self, command: Command) -> Result<CommandResult>;
}

/// Runs commands as OS processes
#[derive(Debug, Default, Clone, Copy)]
pub struct OsRunner;

impl ProcessRunner for OsRunner {
    async fn run(&mut self, command: Command) -> Result<CommandResult> {
        command.run_to_completion().await
    }
}
