// src/core/shell.rs

//! # Shell Session
//!
//! A [`Shell`] ties a shared [`NamespaceHandle`] to a working directory. Each call works
//! on one namespace snapshot from start to finish; replacing the namespace through the
//! handle is atomic and only affects calls that start afterwards.

use crate::core::assist::{AssistReport, AssistResult, resolve_for_assist};
use crate::core::command_line::{ExecutableCommand, resolve_for_execute};
use crate::core::errors::{ErrorKind, ResolutionError};
use crate::core::execution::ExecutionContext;
use crate::core::namespace::{DirectoryId, Namespace};
use crate::core::output::CliOutput;
use arc_swap::ArcSwap;
use std::sync::Arc;
use thiserror::Error;

/// Why a line could not be run.
#[derive(Error, Debug)]
pub enum ShellError {
    /// The line did not resolve.
    #[error(transparent)]
    Resolution(#[from] ResolutionError),
    /// The executor returned an error.
    #[error("Command '{command}' failed: {source}")]
    Execution {
        /// Path of the command that failed.
        command: String,
        /// The executor's error.
        #[source]
        source: anyhow::Error,
    },
}

impl ShellError {
    /// The kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Resolution(e) => e.kind(),
            Self::Execution { .. } => ErrorKind::CommandExecutionFailure,
        }
    }
}

/// A cheaply cloneable, swappable reference to the current namespace.
#[derive(Debug, Clone)]
pub struct NamespaceHandle {
    current: Arc<ArcSwap<Namespace>>,
}

impl NamespaceHandle {
    /// A handle holding `namespace`.
    pub fn new(namespace: Namespace) -> Self {
        Self {
            current: Arc::new(ArcSwap::from_pointee(namespace)),
        }
    }

    /// The current snapshot. It stays valid even if the namespace is replaced meanwhile.
    pub fn load(&self) -> Arc<Namespace> {
        self.current.load_full()
    }

    /// Swaps in `namespace`. Snapshots already loaded are unaffected.
    pub fn replace(&self, namespace: Namespace) {
        log::debug!(
            "Replacing namespace ({} directories, {} commands).",
            namespace.directory_count(),
            namespace.command_count()
        );
        self.current.store(Arc::new(namespace));
    }
}

/// One interactive session over a namespace.
#[derive(Debug)]
pub struct Shell {
    namespace: NamespaceHandle,
    /// Kept as a path so it survives namespace replacement.
    working_directory: String,
}

impl Shell {
    /// A session at the root of `namespace`.
    pub fn new(namespace: NamespaceHandle) -> Self {
        Self {
            namespace,
            working_directory: crate::constants::PATH_DELIMITER.to_string(),
        }
    }

    /// The handle this session reads from.
    pub fn namespace(&self) -> &NamespaceHandle {
        &self.namespace
    }

    /// Absolute path of the working directory.
    pub fn working_directory(&self) -> &str {
        &self.working_directory
    }

    /// Moves to `path`, resolved from the current working directory.
    pub fn change_directory(&mut self, path: &str) -> Result<(), ResolutionError> {
        let namespace = self.namespace.load();
        let from = self.locate(&namespace);
        let target = namespace.find_directory(from, path)?;
        self.working_directory = namespace.directory_path(target);
        Ok(())
    }

    /// The prompt with `{path}` replaced by the working directory.
    pub fn prompt(&self, template: &str) -> String {
        template.replace("{path}", &self.working_directory)
    }

    /// Finds the working directory in `namespace`, falling back to the root when a
    /// replacement removed it.
    fn locate(&self, namespace: &Namespace) -> DirectoryId {
        namespace
            .find_directory(namespace.root(), &self.working_directory)
            .unwrap_or_else(|e| {
                log::warn!(
                    "Working directory '{}' is gone ({e}); falling back to the root.",
                    self.working_directory
                );
                namespace.root()
            })
    }

    /// Resolves and runs one line. A blank line does nothing.
    pub fn execute(&mut self, line: &str, output: &mut dyn CliOutput) -> Result<(), ShellError> {
        if line.trim().is_empty() {
            return Ok(());
        }
        let namespace = self.namespace.load();
        let working_directory = self.locate(&namespace);
        self.working_directory = namespace.directory_path(working_directory);

        let ExecutableCommand { command, mut args } =
            resolve_for_execute(&namespace, working_directory, line)?;
        let executor = namespace.cmd(command)?.executor();

        let mut ctx = ExecutionContext::new(output, &namespace, working_directory);
        executor
            .execute(&mut ctx, &mut args)
            .map_err(|source| ShellError::Execution {
                command: namespace.command_path(command),
                source,
            })?;

        if let Some(next) = ctx.requested_directory() {
            self.working_directory = namespace.directory_path(next);
            log::debug!("Working directory is now '{}'", self.working_directory);
        }
        Ok(())
    }

    /// Completion assistance for `line` up to the char index `cursor`.
    pub fn assist(&self, line: &str, cursor: usize) -> AssistResult {
        let namespace = self.namespace.load();
        resolve_for_assist(&namespace, self.locate(&namespace), line, cursor)
    }

    /// Like [`assist`](Self::assist), rendered against the same snapshot.
    pub fn assist_report(&self, line: &str, cursor: usize) -> AssistReport {
        let namespace = self.namespace.load();
        let result = resolve_for_assist(&namespace, self.locate(&namespace), line, cursor);
        AssistReport::new(&namespace, &result)
    }
}

// MARK: --- UNIT TESTS ---

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::output::BufferedOutput;
    use crate::core::test_support::{noop, sample_namespace};
    use crate::models::DirectoryDef;

    fn shell() -> Shell {
        Shell::new(NamespaceHandle::new(sample_namespace()))
    }

    #[test]
    fn test_execute_writes_output() {
        let mut shell = shell();
        let mut out = BufferedOutput::new();
        shell.execute("echo 'hello there'", &mut out).unwrap();
        assert_eq!(out.messages(), vec!["hello there"]);
    }

    #[test]
    fn test_blank_line_is_a_no_op() {
        let mut shell = shell();
        let mut out = BufferedOutput::new();
        shell.execute("   ", &mut out).unwrap();
        assert!(out.lines().is_empty());
    }

    #[test]
    fn test_resolution_errors_keep_their_kind() {
        let mut shell = shell();
        let mut out = BufferedOutput::new();
        let err = shell.execute("net/tools/ping", &mut out).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingMandatoryParameter);
    }

    #[test]
    fn test_toggle_state_round_trips_through_the_session() {
        let mut shell = shell();
        let mut out = BufferedOutput::new();
        shell.execute("verbose", &mut out).unwrap();
        shell.execute("verbose", &mut out).unwrap();
        assert_eq!(out.messages(), vec!["verbose: true", "verbose: false"]);
    }

    #[test]
    fn test_explicit_toggle_value_ignores_prior_state() {
        let mut shell = shell();
        let mut out = BufferedOutput::new();
        shell.execute("verbose", &mut out).unwrap();
        shell.execute("verbose false", &mut out).unwrap();
        shell.execute("verbose false", &mut out).unwrap();
        assert_eq!(
            out.messages(),
            vec!["verbose: true", "verbose: false", "verbose: false"]
        );
    }

    #[test]
    fn test_change_directory_and_relative_resolution() {
        let mut shell = shell();
        shell.change_directory("net/tools").unwrap();
        assert_eq!(shell.working_directory(), "/net/tools");
        assert_eq!(shell.prompt("{path}> "), "/net/tools> ");

        let mut out = BufferedOutput::new();
        shell.execute("echo local", &mut out).unwrap();
        assert_eq!(out.messages(), vec!["local"]);

        assert!(shell.change_directory("missing").is_err());
        assert_eq!(shell.working_directory(), "/net/tools");
    }

    #[test]
    fn test_replacement_falls_back_to_root() {
        let mut shell = shell();
        shell.change_directory("/foo/bar").unwrap();

        let root = DirectoryDef::root().command(noop("only")).unwrap().build();
        shell
            .namespace()
            .replace(Namespace::builder(root).build().unwrap());

        let mut out = BufferedOutput::new();
        shell.execute("only", &mut out).unwrap();
        assert_eq!(shell.working_directory(), "/");
    }

    #[test]
    fn test_loaded_snapshot_survives_replacement() {
        let handle = NamespaceHandle::new(sample_namespace());
        let before = handle.load();
        handle.replace(Namespace::builder(DirectoryDef::root().build()).build().unwrap());
        assert!(before.find_directory(before.root(), "net").is_ok());
        assert_eq!(handle.load().directory_count(), 1);
    }
}
