// src/core/execution.rs

//! The executor seam between the engine and the code behind each command.

use crate::core::args::CommandArgs;
use crate::core::namespace::{DirectoryId, Namespace};
use crate::core::output::CliOutput;
use std::fmt;

/// Runs a command with its bound arguments. Failures are reported to the caller as
/// command-execution failures, never as parse failures.
pub trait CommandExecutor: Send + Sync {
    /// Runs the command once. `args` holds one value per declared parameter.
    fn execute(&self, ctx: &mut ExecutionContext<'_>, args: &mut CommandArgs) -> anyhow::Result<()>;
}

impl<F> CommandExecutor for F
where
    F: Fn(&mut ExecutionContext<'_>, &mut CommandArgs) -> anyhow::Result<()> + Send + Sync,
{
    fn execute(&self, ctx: &mut ExecutionContext<'_>, args: &mut CommandArgs) -> anyhow::Result<()> {
        self(ctx, args)
    }
}

/// What an executor can see and affect while it runs.
pub struct ExecutionContext<'a> {
    output: &'a mut dyn CliOutput,
    namespace: &'a Namespace,
    working_directory: DirectoryId,
    next_working_directory: Option<DirectoryId>,
}

impl<'a> ExecutionContext<'a> {
    /// A context for a command run from `working_directory`.
    pub fn new(
        output: &'a mut dyn CliOutput,
        namespace: &'a Namespace,
        working_directory: DirectoryId,
    ) -> Self {
        Self {
            output,
            namespace,
            working_directory,
            next_working_directory: None,
        }
    }

    /// The sink the command writes to.
    pub fn output(&mut self) -> &mut dyn CliOutput {
        &mut *self.output
    }

    /// Shorthand for `output().println`.
    pub fn println(&mut self, message: &str) {
        self.output.println(message);
    }

    /// Shorthand for `output().eprintln`.
    pub fn eprintln(&mut self, message: &str) {
        self.output.eprintln(message);
    }

    /// The namespace snapshot the command was resolved against.
    pub fn namespace(&self) -> &'a Namespace {
        self.namespace
    }

    /// Where the session was when the command was invoked.
    pub fn working_directory(&self) -> DirectoryId {
        self.working_directory
    }

    /// Asks the session to move to `directory` once the command has succeeded.
    pub fn change_directory(&mut self, directory: DirectoryId) {
        self.next_working_directory = Some(directory);
    }

    /// The directory requested through [`change_directory`](Self::change_directory), if any.
    pub fn requested_directory(&self) -> Option<DirectoryId> {
        self.next_working_directory
    }
}

impl fmt::Debug for ExecutionContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("working_directory", &self.working_directory)
            .field("next_working_directory", &self.next_working_directory)
            .finish_non_exhaustive()
    }
}
