// src/core/namespace.rs

//! # Namespace
//!
//! The compiled, immutable form of a [`DirectoryDef`] tree. Directories and commands live
//! in two arenas and refer to each other by index, so the parent of a node is fixed the
//! moment the node is created and never changes afterwards. Path walking, command lookup
//! and path completion all work on this structure.

use crate::constants::{CURRENT_DIRECTORY, PARENT_DIRECTORY, PATH_DELIMITER};
use crate::core::completion::{CompletionKind, Suggestions};
use crate::core::errors::ResolutionError;
use crate::core::execution::CommandExecutor;
use crate::core::parameters::{CliParam, ParamResolver};
use crate::core::trie::{Trie, TrieBuilder, TrieError};
use crate::models::{CommandDef, DefinitionError, DirectoryDef, Identifier};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Index of a directory in its [`Namespace`]. Only meaningful for that namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct DirectoryId(usize);

/// Index of a command in its [`Namespace`]. Only meaningful for that namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct CommandId(usize);

/// Failures while compiling definitions into a [`Namespace`].
#[derive(Error, Debug)]
pub enum NamespaceError {
    /// Two children of one directory, or two globals, fold to the same name.
    #[error("Name clash in directory '{directory}': {source}")]
    NameClash {
        /// Path of the directory holding the clash.
        directory: String,
        /// The trie's complaint.
        #[source]
        source: TrieError,
    },
    /// A parameter definition was rejected by the [`ParamResolver`].
    #[error("Invalid definition in command '{command}': {source}")]
    Definition {
        /// Name of the command declaring it.
        command: String,
        /// Why it was rejected.
        #[source]
        source: DefinitionError,
    },
    /// An arena index did not resolve.
    #[error("Internal namespace error: {0}")]
    Internal(String),
}

/// What [`Namespace::complete_path`] should offer besides directories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathTarget {
    /// Directories only.
    Directories,
    /// Directories and commands; a bare relative name also matches global commands.
    Commands,
}

// --- NODES ---

/// A compiled directory with its children indexed for lookup.
#[derive(Debug)]
pub struct Directory {
    identifier: Identifier,
    parent: Option<DirectoryId>,
    directories: Trie<DirectoryId>,
    commands: Trie<CommandId>,
}

impl Directory {
    /// Name and description.
    pub fn identifier(&self) -> &Identifier {
        &self.identifier
    }

    /// The name, empty for the root.
    pub fn name(&self) -> &str {
        self.identifier.name()
    }

    /// `None` only for the root.
    pub fn parent(&self) -> Option<DirectoryId> {
        self.parent
    }

    /// Child directories by name.
    pub fn directories(&self) -> &Trie<DirectoryId> {
        &self.directories
    }

    /// Child commands by name.
    pub fn commands(&self) -> &Trie<CommandId> {
        &self.commands
    }

    /// Whether this is the root directory.
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Whether there is neither a child directory nor a command.
    pub fn is_empty(&self) -> bool {
        self.directories.is_empty() && self.commands.is_empty()
    }
}

/// A compiled command with resolved parameters.
pub struct Command {
    identifier: Identifier,
    directory: Option<DirectoryId>,
    params: Vec<CliParam>,
    param_names: Trie<usize>,
    executor: Arc<dyn CommandExecutor>,
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("identifier", &self.identifier)
            .field("directory", &self.directory)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

impl Command {
    /// Name and description.
    pub fn identifier(&self) -> &Identifier {
        &self.identifier
    }

    /// The command name.
    pub fn name(&self) -> &str {
        self.identifier.name()
    }

    /// The owning directory, or `None` for a global command.
    pub fn directory(&self) -> Option<DirectoryId> {
        self.directory
    }

    /// Whether the command is reachable from every directory.
    pub fn is_global(&self) -> bool {
        self.directory.is_none()
    }

    /// Parameters in declaration order.
    pub fn params(&self) -> &[CliParam] {
        &self.params
    }

    /// The parameter at `index`.
    pub fn param(&self, index: usize) -> Option<&CliParam> {
        self.params.get(index)
    }

    /// Case-insensitive lookup of a parameter's position.
    pub fn param_index(&self, name: &str) -> Option<usize> {
        self.param_names.get(name).copied()
    }

    /// Parameter positions by name.
    pub fn param_names(&self) -> &Trie<usize> {
        &self.param_names
    }

    /// The code run on execution.
    pub fn executor(&self) -> &Arc<dyn CommandExecutor> {
        &self.executor
    }

    /// One-line synopsis such as `ping <host:string> [count:int]`.
    pub fn usage(&self) -> String {
        let mut usage = self.name().to_string();
        for param in &self.params {
            let (open, close) = if param.is_optional() { ('[', ']') } else { ('<', '>') };
            usage.push_str(&format!(" {open}{}:{}{close}", param.name(), param.kind()));
        }
        usage
    }
}

// --- NAMESPACE ---

/// An immutable tree of directories and commands, plus global commands.
#[derive(Debug)]
pub struct Namespace {
    directories: Vec<Directory>,
    commands: Vec<Command>,
    globals: Trie<CommandId>,
}

impl Namespace {
    /// Starts compiling `root`.
    pub fn builder(root: DirectoryDef) -> NamespaceBuilder {
        NamespaceBuilder::new(root)
    }

    /// The root directory.
    pub fn root(&self) -> DirectoryId {
        DirectoryId(0)
    }

    /// Looks up a directory by id.
    pub fn directory(&self, id: DirectoryId) -> Option<&Directory> {
        self.directories.get(id.0)
    }

    /// Looks up a command by id.
    pub fn command(&self, id: CommandId) -> Option<&Command> {
        self.commands.get(id.0)
    }

    /// Global commands by name.
    pub fn globals(&self) -> &Trie<CommandId> {
        &self.globals
    }

    /// The number of directories, root included.
    pub fn directory_count(&self) -> usize {
        self.directories.len()
    }

    /// The number of commands, globals included.
    pub fn command_count(&self) -> usize {
        self.commands.len()
    }

    pub(crate) fn dir(&self, id: DirectoryId) -> Result<&Directory, ResolutionError> {
        self.directory(id)
            .ok_or_else(|| ResolutionError::InternalError(format!("dangling directory id {}", id.0)))
    }

    pub(crate) fn cmd(&self, id: CommandId) -> Result<&Command, ResolutionError> {
        self.command(id)
            .ok_or_else(|| ResolutionError::InternalError(format!("dangling command id {}", id.0)))
    }

    /// The absolute path of a directory; `/` for the root.
    pub fn directory_path(&self, id: DirectoryId) -> String {
        let mut names = Vec::new();
        let mut current = self.directory(id);
        while let Some(directory) = current {
            let Some(parent) = directory.parent else {
                break;
            };
            names.push(directory.name());
            current = self.directory(parent);
        }
        names.reverse();
        format!("{PATH_DELIMITER}{}", names.join(&PATH_DELIMITER.to_string()))
    }

    /// The absolute path of a command; just its name for a global command.
    pub fn command_path(&self, id: CommandId) -> String {
        let Some(command) = self.command(id) else {
            return String::new();
        };
        match command.directory {
            None => command.name().to_string(),
            Some(directory) if directory == self.root() => {
                format!("{PATH_DELIMITER}{}", command.name())
            }
            Some(directory) => format!(
                "{}{PATH_DELIMITER}{}",
                self.directory_path(directory),
                command.name()
            ),
        }
    }

    // --- PATH WALKING ---

    /// Walks `path` from `from` (or from the root when it starts with `/`).
    /// A trailing `/` is ignored; an empty path is `from` itself.
    pub fn find_directory(&self, from: DirectoryId, path: &str) -> Result<DirectoryId, ResolutionError> {
        check_path(path)?;
        let (start, relative) = match path.strip_prefix(PATH_DELIMITER) {
            Some(rest) => (self.root(), rest),
            None => (from, path),
        };
        let relative = relative.strip_suffix(PATH_DELIMITER).unwrap_or(relative);
        if relative.is_empty() {
            return Ok(start);
        }
        relative
            .split(PATH_DELIMITER)
            .try_fold(start, |current, segment| self.step(current, segment))
    }

    fn step(&self, current: DirectoryId, segment: &str) -> Result<DirectoryId, ResolutionError> {
        let directory = self.dir(current)?;
        let not_found = || ResolutionError::DirectoryNotFound {
            name: segment.to_string(),
            parent: self.directory_path(current),
        };
        match segment {
            CURRENT_DIRECTORY => Ok(current),
            PARENT_DIRECTORY => directory.parent.ok_or_else(not_found),
            name => directory.directories.get(name).copied().ok_or_else(not_found),
        }
    }

    /// Resolves a command path. A bare name that is not found in `from` falls back to
    /// the global commands; local commands win over globals.
    pub fn find_command(&self, from: DirectoryId, path: &str) -> Result<CommandId, ResolutionError> {
        let (directory_part, name) = split_command_path(path)?;
        let directory = match directory_part {
            Some(part) => self.find_directory(from, part)?,
            None => from,
        };
        self.lookup_command(directory, name, directory_part.is_none())
    }

    pub(crate) fn lookup_command(
        &self,
        directory: DirectoryId,
        name: &str,
        allow_global: bool,
    ) -> Result<CommandId, ResolutionError> {
        let dir = self.dir(directory)?;
        if let Some(id) = dir.commands.get(name) {
            return Ok(*id);
        }
        if allow_global && let Some(id) = self.globals.get(name) {
            log::trace!("'{name}' resolved to a global command");
            return Ok(*id);
        }
        Err(ResolutionError::CommandNotFound {
            name: name.to_string(),
            directory: self.directory_path(directory),
        })
    }

    // --- COMPLETION ---

    /// Completes the last segment of a partially typed path. The directory part must
    /// resolve; candidates are the children of that directory starting with the last
    /// segment.
    pub fn complete_path(
        &self,
        from: DirectoryId,
        partial: &str,
        target: PathTarget,
    ) -> Result<Suggestions, ResolutionError> {
        check_path(partial)?;
        let (directory_part, last) = split_last_segment(partial);
        let directory_id = match directory_part {
            Some(part) => self.find_directory(from, part)?,
            None => from,
        };
        let directory = self.dir(directory_id)?;
        let with_globals = target == PathTarget::Commands && directory_part.is_none();

        if directory.is_empty() && !(with_globals && !self.globals.is_empty()) {
            return Err(ResolutionError::EmptyDirectory {
                path: self.directory_path(directory_id),
            });
        }

        let mut candidates = directory
            .directories
            .sub_trie(last)
            .map_values(|_| CompletionKind::Directory);
        if target == PathTarget::Commands {
            let commands = directory
                .commands
                .sub_trie(last)
                .map_values(|_| CompletionKind::Command);
            candidates = candidates.union(&commands);
            if with_globals {
                let globals = self.globals.sub_trie(last).map_values(|_| CompletionKind::Command);
                candidates = globals.union(&candidates);
            }
        }

        let replace_prefix = partial.strip_suffix(last).unwrap_or_default();
        Ok(Suggestions::new(replace_prefix, last, candidates))
    }
}

fn check_path(path: &str) -> Result<(), ResolutionError> {
    let double = format!("{PATH_DELIMITER}{PATH_DELIMITER}");
    if path.contains(&double) {
        return Err(ResolutionError::invalid_path(path, "empty path segment"));
    }
    Ok(())
}

/// Splits `a/b/c` into `(Some("a/b"), "c")`, `/c` into `(Some("/"), "c")`
/// and `c` into `(None, "c")`.
fn split_last_segment(path: &str) -> (Option<&str>, &str) {
    match path.rsplit_once(PATH_DELIMITER) {
        Some(("", last)) => (Some("/"), last),
        Some((directory, last)) => (Some(directory), last),
        None => (None, path),
    }
}

/// Validates a command token and splits it into its directory part and command name.
pub(crate) fn split_command_path(path: &str) -> Result<(Option<&str>, &str), ResolutionError> {
    if path.is_empty() {
        return Err(ResolutionError::invalid_path(path, "empty command path"));
    }
    check_path(path)?;
    if path.ends_with(PATH_DELIMITER) {
        return Err(ResolutionError::invalid_path(
            path,
            "expected a command, found a directory path",
        ));
    }
    Ok(split_last_segment(path))
}

// --- CONSTRUCTION ---

/// Compiles a definition tree plus optional global commands into a [`Namespace`].
#[derive(Debug)]
pub struct NamespaceBuilder {
    root: DirectoryDef,
    globals: Vec<CommandDef>,
    resolver: ParamResolver,
}

impl NamespaceBuilder {
    /// A builder for `root` with the default resolver and no globals.
    pub fn new(root: DirectoryDef) -> Self {
        Self {
            root,
            globals: Vec::new(),
            resolver: ParamResolver::new(),
        }
    }

    /// Uses `resolver` for every parameter.
    pub fn resolver(mut self, resolver: ParamResolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// A command reachable by bare name from every directory.
    pub fn global_command(mut self, def: CommandDef) -> Self {
        self.globals.push(def);
        self
    }

    /// Adds several global commands.
    pub fn global_commands(mut self, defs: impl IntoIterator<Item = CommandDef>) -> Self {
        self.globals.extend(defs);
        self
    }

    /// Compiles the tree. Fails on name clashes or rejected parameters.
    pub fn build(self) -> Result<Namespace, NamespaceError> {
        let mut arena = Arena {
            directories: Vec::new(),
            commands: Vec::new(),
            resolver: &self.resolver,
        };
        arena.add_directory(self.root, None)?;

        let mut globals = TrieBuilder::new();
        for def in self.globals {
            let name = def.name().to_string();
            let id = arena.add_command(def, None)?;
            globals
                .add(name, id)
                .map_err(|source| NamespaceError::NameClash {
                    directory: "<global>".to_string(),
                    source,
                })?;
        }

        log::debug!(
            "Namespace compiled: {} directories, {} commands.",
            arena.directories.len(),
            arena.commands.len()
        );
        Ok(Namespace {
            directories: arena.directories,
            commands: arena.commands,
            globals: globals.build(),
        })
    }
}

struct Arena<'r> {
    directories: Vec<Directory>,
    commands: Vec<Command>,
    resolver: &'r ParamResolver,
}

impl Arena<'_> {
    fn add_directory(
        &mut self,
        def: DirectoryDef,
        parent: Option<DirectoryId>,
    ) -> Result<DirectoryId, NamespaceError> {
        let (identifier, child_directories, child_commands) = def.into_parts();
        let id = DirectoryId(self.directories.len());
        let label = if parent.is_none() {
            PATH_DELIMITER.to_string()
        } else {
            identifier.name().to_string()
        };
        self.directories.push(Directory {
            identifier,
            parent,
            directories: Trie::new(),
            commands: Trie::new(),
        });

        let clash = |source| NamespaceError::NameClash {
            directory: label.clone(),
            source,
        };
        let mut directories = TrieBuilder::new();
        for child in child_directories {
            let name = child.identifier().name().to_string();
            let child_id = self.add_directory(child, Some(id))?;
            directories.add(name, child_id).map_err(clash)?;
        }
        let mut commands = TrieBuilder::new();
        for command in child_commands {
            let name = command.name().to_string();
            let command_id = self.add_command(command, Some(id))?;
            commands.add(name, command_id).map_err(clash)?;
        }

        let slot = self
            .directories
            .get_mut(id.0)
            .ok_or_else(|| NamespaceError::Internal(format!("directory slot {} vanished", id.0)))?;
        slot.directories = directories.build();
        slot.commands = commands.build();
        Ok(id)
    }

    fn add_command(
        &mut self,
        def: CommandDef,
        directory: Option<DirectoryId>,
    ) -> Result<CommandId, NamespaceError> {
        let (identifier, param_defs, executor) = def.into_parts();
        let params = param_defs
            .into_iter()
            .map(|param| self.resolver.resolve(param))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|source| NamespaceError::Definition {
                command: identifier.name().to_string(),
                source,
            })?;

        let mut names = TrieBuilder::new();
        for (index, param) in params.iter().enumerate() {
            names
                .add(param.name(), index)
                .map_err(|source| NamespaceError::NameClash {
                    directory: identifier.name().to_string(),
                    source,
                })?;
        }

        let id = CommandId(self.commands.len());
        self.commands.push(Command {
            identifier,
            directory,
            params,
            param_names: names.build(),
            executor,
        });
        Ok(id)
    }
}

// MARK: --- UNIT TESTS ---

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::test_support::{noop, sample_namespace};

    fn dir(ns: &Namespace, path: &str) -> Result<String, ResolutionError> {
        ns.find_directory(ns.root(), path).map(|id| ns.directory_path(id))
    }

    #[test]
    fn test_paths_are_built_from_parents() {
        let ns = sample_namespace();
        assert_eq!(ns.directory_path(ns.root()), "/");
        let tools = ns.find_directory(ns.root(), "/net/tools").unwrap();
        assert_eq!(ns.directory_path(tools), "/net/tools");
        let ping = ns.find_command(ns.root(), "net/tools/ping").unwrap();
        assert_eq!(ns.command_path(ping), "/net/tools/ping");
        let echo = ns.find_command(ns.root(), "echo").unwrap();
        assert_eq!(ns.command_path(echo), "/echo");
    }

    #[test]
    fn test_find_directory_relative_absolute_and_special_segments() {
        let ns = sample_namespace();
        let bar = ns.find_directory(ns.root(), "foo/bar").unwrap();

        let baz = ns.find_directory(bar, "baz").unwrap();
        assert_eq!(ns.directory_path(baz), "/foo/bar/baz");
        // "/baz" is absolute and the root has no "baz".
        assert!(matches!(
            ns.find_directory(bar, "/baz"),
            Err(ResolutionError::DirectoryNotFound { .. })
        ));

        assert_eq!(dir(&ns, "net/").unwrap(), "/net");
        assert_eq!(dir(&ns, "NET/Tools").unwrap(), "/net/tools");
        assert_eq!(dir(&ns, "net/./tools/..").unwrap(), "/net");
        assert_eq!(dir(&ns, "").unwrap(), "/");
        assert!(matches!(dir(&ns, ".."), Err(ResolutionError::DirectoryNotFound { .. })));
        assert!(matches!(dir(&ns, "foo//bar"), Err(ResolutionError::InvalidPath { .. })));
    }

    #[test]
    fn test_find_command_and_global_fallback() {
        let ns = sample_namespace();
        let tools = ns.find_directory(ns.root(), "net/tools").unwrap();

        let local_echo = ns.find_command(tools, "echo").unwrap();
        assert_eq!(ns.command_path(local_echo), "/net/tools/echo");

        let global = ns.find_command(tools, "pwd").unwrap();
        assert!(ns.command(global).unwrap().is_global());
        assert_eq!(ns.command_path(global), "pwd");

        // Globals only answer bare names.
        assert!(matches!(
            ns.find_command(ns.root(), "net/pwd"),
            Err(ResolutionError::CommandNotFound { .. })
        ));
        assert!(matches!(
            ns.find_command(ns.root(), "net/"),
            Err(ResolutionError::InvalidPath { .. })
        ));
    }

    #[test]
    fn test_complete_path_lists_matching_children() {
        let ns = sample_namespace();

        let top = ns.complete_path(ns.root(), "", PathTarget::Commands).unwrap();
        assert_eq!(top.candidates().words(), vec!["echo", "foo", "net", "pwd", "verbose"]);

        let nested = ns.complete_path(ns.root(), "/net/t", PathTarget::Commands).unwrap();
        assert_eq!(nested.replace_prefix(), "/net/");
        assert_eq!(nested.typed(), "t");
        assert_eq!(nested.candidates().words(), vec!["tools"]);

        let only_dirs = ns.complete_path(ns.root(), "net/", PathTarget::Directories).unwrap();
        assert_eq!(only_dirs.candidates().words(), vec!["tools"]);
    }

    #[test]
    fn test_complete_path_in_empty_directory_fails() {
        let ns = sample_namespace();
        assert!(matches!(
            ns.complete_path(ns.root(), "foo/bar/baz/", PathTarget::Commands),
            Err(ResolutionError::EmptyDirectory { .. })
        ));
    }

    #[test]
    fn test_global_name_clash_is_rejected() {
        let result = Namespace::builder(DirectoryDef::root().build())
            .global_command(noop("x"))
            .global_command(noop("X"))
            .build();
        assert!(matches!(result, Err(NamespaceError::NameClash { .. })));
    }

    #[test]
    fn test_usage_marks_optional_params() {
        let ns = sample_namespace();
        let ping = ns.find_command(ns.root(), "/net/tools/ping").unwrap();
        assert_eq!(
            ns.command(ping).unwrap().usage(),
            "ping <host:string> [count:int]"
        );
    }
}
