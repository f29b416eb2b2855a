// src/models.rs

//! # Definition Models
//!
//! The immutable definitions an embedder hands to the engine: identifiers, parameter
//! definitions, commands and directories. They are produced by any definition source
//! (code, declarative configuration, ...) and compiled once into a
//! [`Namespace`](crate::core::namespace::Namespace).

use crate::constants::{CURRENT_DIRECTORY, PARAM_VALUE_DELIMITER, PARENT_DIRECTORY, PATH_DELIMITER};
use crate::core::args::CommandArgs;
use crate::core::execution::{CommandExecutor, ExecutionContext};
use crate::core::trie::fold_word;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// A lazily evaluated, shareable value producer.
pub type Supplier<T> = Arc<dyn Fn() -> T + Send + Sync>;

/// A definition that can never be part of a valid namespace.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DefinitionError {
    /// The name is empty or contains path or argument syntax.
    #[error("Invalid name '{name}': {reason}.")]
    InvalidName {
        /// The rejected name.
        name: String,
        /// The rule it breaks.
        reason: &'static str,
    },
    /// A directory already has a child directory or command of that name.
    #[error("Directory '{parent}' already contains an entry named '{name}'.")]
    DuplicateChild {
        /// Name of the directory.
        parent: String,
        /// The clashing name as given.
        name: String,
    },
    /// A command already has a parameter of that name.
    #[error("Command '{command}' already declares a parameter named '{name}'.")]
    DuplicateParam {
        /// Name of the command.
        command: String,
        /// The clashing name as given.
        name: String,
    },
    /// A default or a static value set does not fit the parameter.
    #[error("Invalid default value '{value}' for parameter '{name}': {reason}.")]
    InvalidDefault {
        /// The parameter name.
        name: String,
        /// The offending value.
        value: String,
        /// Why it does not fit.
        reason: String,
    },
}

// --- IDENTIFIER ---

/// The name and description shared by directories, commands and parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identifier {
    name: String,
    description: String,
}

impl Identifier {
    /// Creates an identifier. Names must be a single non-empty token that cannot be
    /// confused with path syntax or a named argument.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<Self, DefinitionError> {
        let name = name.into();
        let invalid = |reason| DefinitionError::InvalidName {
            name: name.clone(),
            reason,
        };

        if name.is_empty() {
            return Err(invalid("names must not be empty"));
        }
        if name.contains(PATH_DELIMITER) {
            return Err(invalid("names must not contain the path delimiter"));
        }
        if name.contains(PARAM_VALUE_DELIMITER) {
            return Err(invalid("names must not contain '='"));
        }
        if name.chars().any(|c| c.is_whitespace() || c == '\'' || c == '"') {
            return Err(invalid("names must not contain whitespace or quotes"));
        }
        if name == CURRENT_DIRECTORY || name == PARENT_DIRECTORY {
            return Err(invalid("'.' and '..' are reserved path segments"));
        }

        Ok(Self {
            name,
            description: description.into(),
        })
    }

    /// The nameless identifier of the namespace root.
    pub fn root(description: impl Into<String>) -> Self {
        Self {
            name: String::new(),
            description: description.into(),
        }
    }

    /// The name, empty only for the root.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Free text shown by `man`.
    pub fn description(&self) -> &str {
        &self.description
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

// --- PARAMETER DEFINITIONS ---

/// The fixed set of parameter kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamKind {
    /// 64-bit integer.
    Int,
    /// 64-bit float.
    Double,
    /// Boolean.
    Bool,
    /// Text, optionally from a value set.
    String,
    /// Path to a directory.
    Directory,
    /// Path to a command.
    Command,
    /// Boolean defaulting to the negated current state.
    Toggle,
}

impl ParamKind {
    /// A short, human readable type name (`int`, `directory`, ...).
    pub fn type_name(self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Double => "double",
            Self::Bool => "bool",
            Self::String => "string",
            Self::Directory => "directory",
            Self::Command => "command",
            Self::Toggle => "bool",
        }
    }
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// A parameter whose value is parsed from a token and may fall back to a default.
///
/// The presence of a default supplier makes the parameter optional.
/// For `Directory` and `Command` parameters `T` is the *path* to resolve
/// (e.g. `"."` for the working directory).
#[derive(Clone)]
pub struct ValueParamDef<T> {
    identifier: Identifier,
    default: Option<Supplier<T>>,
}

impl<T: 'static> ValueParamDef<T> {
    /// A mandatory parameter.
    pub fn new(identifier: Identifier) -> Self {
        Self {
            identifier,
            default: None,
        }
    }

    /// Makes the parameter optional, defaulting to a fixed value.
    pub fn with_default_value(self, value: T) -> Self
    where
        T: Clone + Send + Sync,
    {
        self.with_default_supplier(move || value.clone())
    }

    /// Makes the parameter optional. The supplier runs each time the parameter is left unbound.
    pub fn with_default_supplier(mut self, supplier: impl Fn() -> T + Send + Sync + 'static) -> Self {
        self.default = Some(Arc::new(supplier));
        self
    }

    /// Name and description.
    pub fn identifier(&self) -> &Identifier {
        &self.identifier
    }

    /// The default, present only for optional parameters.
    pub fn default_supplier(&self) -> Option<&Supplier<T>> {
        self.default.as_ref()
    }
}

impl<T> fmt::Debug for ValueParamDef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueParamDef")
            .field("identifier", &self.identifier)
            .field("optional", &self.default.is_some())
            .finish()
    }
}

/// Where the acceptable values of a string parameter come from.
#[derive(Clone, Default)]
pub enum ValueSource {
    /// Any string is accepted.
    #[default]
    Unconstrained,
    /// A closed set fixed at definition time.
    Static(Vec<String>),
    /// A closed set computed on demand, e.g. from live application state.
    /// An empty result means "unconstrained".
    Dynamic(Supplier<Vec<String>>),
}

impl fmt::Debug for ValueSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unconstrained => f.write_str("Unconstrained"),
            Self::Static(values) => f.debug_tuple("Static").field(values).finish(),
            Self::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

/// A string parameter, optionally constrained to a set of values.
#[derive(Debug, Clone)]
pub struct StringParamDef {
    base: ValueParamDef<String>,
    values: ValueSource,
}

impl StringParamDef {
    /// A mandatory, unconstrained string parameter.
    pub fn new(identifier: Identifier) -> Self {
        Self {
            base: ValueParamDef::new(identifier),
            values: ValueSource::Unconstrained,
        }
    }

    /// Makes the parameter optional, defaulting to `value`.
    pub fn with_default_value(mut self, value: impl Into<String>) -> Self {
        self.base = self.base.with_default_value(value.into());
        self
    }

    /// Makes the parameter optional, asking `supplier` each time it is left unbound.
    pub fn with_default_supplier(
        mut self,
        supplier: impl Fn() -> String + Send + Sync + 'static,
    ) -> Self {
        self.base = self.base.with_default_supplier(supplier);
        self
    }

    /// Restricts the parameter to a fixed set of values.
    pub fn with_static_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.values = ValueSource::Static(values.into_iter().map(Into::into).collect());
        self
    }

    /// Restricts the parameter to a set of values computed whenever it is parsed or completed.
    pub fn with_dynamic_values(
        mut self,
        supplier: impl Fn() -> Vec<String> + Send + Sync + 'static,
    ) -> Self {
        self.values = ValueSource::Dynamic(Arc::new(supplier));
        self
    }

    /// Name and description.
    pub fn identifier(&self) -> &Identifier {
        self.base.identifier()
    }

    /// The default, present only for optional parameters.
    pub fn default_supplier(&self) -> Option<&Supplier<String>> {
        self.base.default_supplier()
    }

    /// Where acceptable values come from.
    pub fn values(&self) -> &ValueSource {
        &self.values
    }
}

/// An optional boolean parameter whose default is the negation of the current state.
/// Omitting it flips the state; supplying it sets the state explicitly.
#[derive(Clone)]
pub struct ToggleParamDef {
    identifier: Identifier,
    state: Supplier<bool>,
}

impl ToggleParamDef {
    /// A toggle reading the current state from `state`.
    pub fn new(identifier: Identifier, state: impl Fn() -> bool + Send + Sync + 'static) -> Self {
        Self {
            identifier,
            state: Arc::new(state),
        }
    }

    /// Name and description.
    pub fn identifier(&self) -> &Identifier {
        &self.identifier
    }

    /// Reads the current state and returns its negation.
    pub fn toggled(&self) -> bool {
        !(self.state)()
    }
}

impl fmt::Debug for ToggleParamDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToggleParamDef")
            .field("identifier", &self.identifier)
            .finish_non_exhaustive()
    }
}

/// A parameter definition: a closed sum over the supported kinds.
#[derive(Debug, Clone)]
pub enum ParamDef {
    /// See [`ParamKind::Int`].
    Int(ValueParamDef<i64>),
    /// See [`ParamKind::Double`].
    Double(ValueParamDef<f64>),
    /// See [`ParamKind::Bool`].
    Bool(ValueParamDef<bool>),
    /// See [`ParamKind::String`].
    String(StringParamDef),
    /// See [`ParamKind::Directory`]. The default is a path.
    Directory(ValueParamDef<String>),
    /// See [`ParamKind::Command`]. The default is a path.
    Command(ValueParamDef<String>),
    /// See [`ParamKind::Toggle`].
    Toggle(ToggleParamDef),
}

impl ParamDef {
    /// Name and description.
    pub fn identifier(&self) -> &Identifier {
        match self {
            Self::Int(def) => def.identifier(),
            Self::Double(def) => def.identifier(),
            Self::Bool(def) => def.identifier(),
            Self::String(def) => def.identifier(),
            Self::Directory(def) | Self::Command(def) => def.identifier(),
            Self::Toggle(def) => def.identifier(),
        }
    }

    /// The parameter name.
    pub fn name(&self) -> &str {
        self.identifier().name()
    }

    /// The value type.
    pub fn kind(&self) -> ParamKind {
        match self {
            Self::Int(_) => ParamKind::Int,
            Self::Double(_) => ParamKind::Double,
            Self::Bool(_) => ParamKind::Bool,
            Self::String(_) => ParamKind::String,
            Self::Directory(_) => ParamKind::Directory,
            Self::Command(_) => ParamKind::Command,
            Self::Toggle(_) => ParamKind::Toggle,
        }
    }

    /// Optional parameters carry a default supplier; toggles are always optional.
    pub fn is_optional(&self) -> bool {
        match self {
            Self::Int(def) => def.default_supplier().is_some(),
            Self::Double(def) => def.default_supplier().is_some(),
            Self::Bool(def) => def.default_supplier().is_some(),
            Self::String(def) => def.default_supplier().is_some(),
            Self::Directory(def) | Self::Command(def) => def.default_supplier().is_some(),
            Self::Toggle(_) => true,
        }
    }
}

impl From<StringParamDef> for ParamDef {
    fn from(def: StringParamDef) -> Self {
        Self::String(def)
    }
}

impl From<ToggleParamDef> for ParamDef {
    fn from(def: ToggleParamDef) -> Self {
        Self::Toggle(def)
    }
}

// --- COMMAND DEFINITIONS ---

/// A named, invocable leaf with an ordered parameter list and an executor.
#[derive(Clone)]
pub struct CommandDef {
    identifier: Identifier,
    params: Vec<ParamDef>,
    executor: Arc<dyn CommandExecutor>,
}

impl CommandDef {
    /// Starts a command definition.
    pub fn builder(identifier: Identifier) -> CommandDefBuilder {
        CommandDefBuilder {
            identifier,
            params: Vec::new(),
            names: HashSet::new(),
        }
    }

    /// A command wrapping a boolean state. It takes one toggle parameter named `value`:
    /// `name` flips the state, `name true|false` sets it. The new state is reported.
    pub fn toggle(
        identifier: Identifier,
        get: impl Fn() -> bool + Send + Sync + 'static,
        set: impl Fn(bool) + Send + Sync + 'static,
    ) -> Result<Self, DefinitionError> {
        let value = Identifier::new("value", format!("New value of '{}'", identifier.name()))?;
        let label = identifier.name().to_string();
        Ok(Self::builder(identifier)
            .param(ToggleParamDef::new(value, get))?
            .build(move |ctx, args| {
                let state = args.pop_bool()?;
                set(state);
                ctx.println(&format!("{label}: {state}"));
                Ok(())
            }))
    }

    /// Name and description.
    pub fn identifier(&self) -> &Identifier {
        &self.identifier
    }

    /// The command name.
    pub fn name(&self) -> &str {
        self.identifier.name()
    }

    /// Parameters in declaration order.
    pub fn params(&self) -> &[ParamDef] {
        &self.params
    }

    /// The code run on execution.
    pub fn executor(&self) -> &Arc<dyn CommandExecutor> {
        &self.executor
    }

    pub(crate) fn into_parts(self) -> (Identifier, Vec<ParamDef>, Arc<dyn CommandExecutor>) {
        (self.identifier, self.params, self.executor)
    }
}

impl fmt::Debug for CommandDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandDef")
            .field("identifier", &self.identifier)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

/// Collects parameters in declaration order, rejecting duplicate names.
#[derive(Debug)]
pub struct CommandDefBuilder {
    identifier: Identifier,
    params: Vec<ParamDef>,
    names: HashSet<String>,
}

impl CommandDefBuilder {
    /// Appends a parameter. Names are compared case-insensitively.
    pub fn param(mut self, def: impl Into<ParamDef>) -> Result<Self, DefinitionError> {
        let def = def.into();
        if !self.names.insert(fold_word(def.name())) {
            return Err(DefinitionError::DuplicateParam {
                command: self.identifier.name().to_string(),
                name: def.name().to_string(),
            });
        }
        self.params.push(def);
        Ok(self)
    }

    /// Finishes the command with a closure executor.
    pub fn build<F>(self, executor: F) -> CommandDef
    where
        F: Fn(&mut ExecutionContext<'_>, &mut CommandArgs) -> anyhow::Result<()>
            + Send
            + Sync
            + 'static,
    {
        self.build_with(Arc::new(executor))
    }

    /// Finishes the command with an already shared executor.
    pub fn build_with(self, executor: Arc<dyn CommandExecutor>) -> CommandDef {
        CommandDef {
            identifier: self.identifier,
            params: self.params,
            executor,
        }
    }
}

// --- DIRECTORY DEFINITIONS ---

/// A namespace node grouping child directories and commands.
#[derive(Debug, Clone)]
pub struct DirectoryDef {
    identifier: Identifier,
    directories: Vec<DirectoryDef>,
    commands: Vec<CommandDef>,
}

impl DirectoryDef {
    /// Starts a directory definition.
    pub fn builder(identifier: Identifier) -> DirectoryDefBuilder {
        DirectoryDefBuilder {
            identifier,
            directories: Vec::new(),
            commands: Vec::new(),
            names: HashSet::new(),
        }
    }

    /// A builder for the nameless root directory.
    pub fn root() -> DirectoryDefBuilder {
        Self::builder(Identifier::root("Root directory"))
    }

    /// Name and description.
    pub fn identifier(&self) -> &Identifier {
        &self.identifier
    }

    /// Child directories in insertion order.
    pub fn directories(&self) -> &[DirectoryDef] {
        &self.directories
    }

    /// Child commands in insertion order.
    pub fn commands(&self) -> &[CommandDef] {
        &self.commands
    }

    pub(crate) fn into_parts(self) -> (Identifier, Vec<DirectoryDef>, Vec<CommandDef>) {
        (self.identifier, self.directories, self.commands)
    }
}

/// Collects children keyed by name. Directories and commands share one namespace per
/// parent, compared case-insensitively.
#[derive(Debug)]
pub struct DirectoryDefBuilder {
    identifier: Identifier,
    directories: Vec<DirectoryDef>,
    commands: Vec<CommandDef>,
    names: HashSet<String>,
}

impl DirectoryDefBuilder {
    fn claim(&mut self, name: &str) -> Result<(), DefinitionError> {
        if self.names.insert(fold_word(name)) {
            Ok(())
        } else {
            Err(DefinitionError::DuplicateChild {
                parent: self.identifier.name().to_string(),
                name: name.to_string(),
            })
        }
    }

    /// Adds a child directory in place.
    pub fn add_directory(&mut self, def: DirectoryDef) -> Result<&mut Self, DefinitionError> {
        self.claim(def.identifier.name())?;
        self.directories.push(def);
        Ok(self)
    }

    /// Adds a child command in place.
    pub fn add_command(&mut self, def: CommandDef) -> Result<&mut Self, DefinitionError> {
        self.claim(def.name())?;
        self.commands.push(def);
        Ok(self)
    }

    /// Chaining form of [`add_directory`](Self::add_directory).
    pub fn directory(mut self, def: DirectoryDef) -> Result<Self, DefinitionError> {
        self.add_directory(def)?;
        Ok(self)
    }

    /// Chaining form of [`add_command`](Self::add_command).
    pub fn command(mut self, def: CommandDef) -> Result<Self, DefinitionError> {
        self.add_command(def)?;
        Ok(self)
    }

    /// Finishes the definition.
    pub fn build(self) -> DirectoryDef {
        DirectoryDef {
            identifier: self.identifier,
            directories: self.directories,
            commands: self.commands,
        }
    }
}

// MARK: --- UNIT TESTS ---

#[cfg(test)]
mod tests {
    use super::*;

    fn id(name: &str) -> Identifier {
        Identifier::new(name, "").unwrap()
    }

    fn noop(name: &str) -> CommandDef {
        CommandDef::builder(id(name)).build(|_, _| Ok(()))
    }

    #[test]
    fn test_identifier_validation() {
        assert!(Identifier::new("ping", "Pings a host").is_ok());
        for bad in ["", "a/b", "a=b", "a b", "it's", ".", ".."] {
            assert!(
                matches!(Identifier::new(bad, ""), Err(DefinitionError::InvalidName { .. })),
                "'{bad}' should be rejected"
            );
        }
    }

    #[test]
    fn test_param_optionality() {
        let mandatory = ParamDef::Int(ValueParamDef::new(id("a")));
        let optional = ParamDef::from(StringParamDef::new(id("b")).with_default_value("x"));
        let toggle = ParamDef::from(ToggleParamDef::new(id("t"), || false));
        assert!(!mandatory.is_optional());
        assert!(optional.is_optional());
        assert!(toggle.is_optional());
        assert_eq!(toggle.kind().type_name(), "bool");
    }

    #[test]
    fn test_toggle_def_negates_current_state() {
        let def = ToggleParamDef::new(id("t"), || true);
        assert!(!def.toggled());
    }

    #[test]
    fn test_command_builder_rejects_duplicate_params() {
        let result = CommandDef::builder(id("cmd"))
            .param(ParamDef::Int(ValueParamDef::new(id("count"))))
            .and_then(|b| b.param(StringParamDef::new(id("COUNT"))));
        assert!(matches!(result, Err(DefinitionError::DuplicateParam { .. })));
    }

    #[test]
    fn test_directory_builder_shares_one_namespace() {
        let result = DirectoryDef::root()
            .directory(DirectoryDef::builder(id("net")).build())
            .and_then(|b| b.command(noop("NET")));
        assert!(matches!(result, Err(DefinitionError::DuplicateChild { .. })));

        let root = DirectoryDef::root()
            .directory(DirectoryDef::builder(id("net")).build())
            .and_then(|b| b.command(noop("ping")))
            .unwrap()
            .build();
        assert_eq!(root.identifier().name(), "");
        assert_eq!(root.directories().len(), 1);
        assert_eq!(root.commands().len(), 1);
    }

    #[test]
    fn test_builders_fold_names_like_trie_lookups() {
        // 'İ' lower-cases to "i\u{307}"; lookups keep only the 'i'.
        let result = DirectoryDef::root()
            .command(noop("\u{130}x"))
            .and_then(|b| b.directory(DirectoryDef::builder(id("ix")).build()));
        assert!(matches!(result, Err(DefinitionError::DuplicateChild { .. })));

        let result = CommandDef::builder(id("cmd"))
            .param(ParamDef::Int(ValueParamDef::new(id("\u{130}d"))))
            .and_then(|b| b.param(StringParamDef::new(id("id"))));
        assert!(matches!(result, Err(DefinitionError::DuplicateParam { .. })));
    }
}
