// src/core/command_line.rs

//! # Command Line Resolution
//!
//! Turns a tokenized line into a command and its bound arguments. The first token is a
//! command path; every following token binds one parameter, either by name (`name=value`)
//! or positionally to the first parameter that is still unbound. Missing optional
//! parameters take their defaults once every token has been consumed.

use crate::core::args::{CommandArgs, ParamValue};
use crate::core::errors::ResolutionError;
use crate::core::namespace::{self, Command, CommandId, DirectoryId, Namespace};
use crate::core::parameters::ParamContext;
use crate::core::tokenizer;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

lazy_static! {
    // `name=value`, where the name cannot hold path, quote or whitespace characters.
    static ref NAMED_ARG_RE: Regex = Regex::new(r#"^([^=/\s'"]+)=(.*)$"#)
        .expect("named argument pattern is valid");
}

/// Splits a `name=value` token. Anything else is a positional token.
pub(crate) fn split_named(token: &str) -> Option<(&str, &str)> {
    NAMED_ARG_RE
        .captures(token)
        .and_then(|caps| Some((caps.get(1)?.as_str(), caps.get(2)?.as_str())))
}

/// Where a resolution currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Walking the directory part of the command path.
    #[default]
    Navigating,
    /// Looking up the command name in the reached directory.
    ResolvingCommand,
    /// Consuming parameter tokens.
    BindingParams,
    /// A command and all of its arguments are resolved.
    Done,
    /// Resolution stopped at an error.
    Failed,
}

/// A parameter bound from a token (defaults excluded).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoundParam {
    /// Position in the command's parameter list.
    pub index: usize,
    /// The parameter name.
    pub name: String,
    /// The parsed value.
    pub value: ParamValue,
}

/// A fully resolved line, ready to run.
#[derive(Debug, Clone)]
pub struct ExecutableCommand {
    /// The command to run.
    pub command: CommandId,
    /// Its arguments, defaults filled in.
    pub args: CommandArgs,
}

// --- PARAMETER BINDING ---

/// Binds tokens to the parameters of one command.
#[derive(Debug)]
pub struct ParamBinder<'a> {
    command: &'a Command,
    ctx: ParamContext<'a>,
    slots: Vec<Option<ParamValue>>,
}

impl<'a> ParamBinder<'a> {
    /// A binder with every parameter unbound.
    pub fn new(command: &'a Command, ctx: ParamContext<'a>) -> Self {
        Self {
            command,
            ctx,
            slots: vec![None; command.params().len()],
        }
    }

    /// The command being bound.
    pub fn command(&self) -> &'a Command {
        self.command
    }

    /// The context values are parsed in.
    pub fn context(&self) -> &ParamContext<'a> {
        &self.ctx
    }

    /// Binds one token. Once every parameter is bound, any further token is an excess
    /// argument, even one shaped like `name=value`.
    pub fn bind(&mut self, token: &str) -> Result<(), ResolutionError> {
        let named = split_named(token);
        if let Some((name, value)) = named
            && let Some(index) = self.command.param_index(name)
        {
            return self.bind_at(index, value);
        }

        let index = self
            .next_positional()
            .ok_or_else(|| ResolutionError::ExcessArguments {
                command: self.command.name().to_string(),
                expected: self.slots.len(),
                token: token.to_string(),
            })?;
        if let Some((name, _)) = named {
            return Err(ResolutionError::InvalidParamName {
                command: self.command.name().to_string(),
                name: name.to_string(),
            });
        }
        self.bind_at(index, token)
    }

    fn bind_at(&mut self, index: usize, raw: &str) -> Result<(), ResolutionError> {
        let param = self.command.param(index).ok_or_else(|| {
            ResolutionError::InternalError(format!("parameter index {index} out of range"))
        })?;
        if self.is_bound(index) {
            return Err(ResolutionError::ParamAlreadyBound {
                name: param.name().to_string(),
            });
        }
        let value = param.parse(raw, &self.ctx)?;
        log::trace!("Bound '{}' = {value}", param.name());
        if let Some(slot) = self.slots.get_mut(index) {
            *slot = Some(value);
        }
        Ok(())
    }

    /// The first parameter, in declaration order, that is still unbound.
    pub fn next_positional(&self) -> Option<usize> {
        self.slots.iter().position(Option::is_none)
    }

    /// Whether the parameter at `index` has a value.
    pub fn is_bound(&self, index: usize) -> bool {
        self.slots.get(index).is_some_and(Option::is_some)
    }

    /// The parameters bound so far, in declaration order.
    pub fn bound(&self) -> Vec<BoundParam> {
        self.command
            .params()
            .iter()
            .zip(&self.slots)
            .enumerate()
            .filter_map(|(index, (param, slot))| {
                slot.as_ref().map(|value| BoundParam {
                    index,
                    name: param.name().to_string(),
                    value: value.clone(),
                })
            })
            .collect()
    }

    /// Checks every mandatory parameter is bound, then fills the rest with defaults.
    pub fn finish(self) -> Result<CommandArgs, ResolutionError> {
        let params = self.command.params();
        if let Some(missing) = params
            .iter()
            .zip(&self.slots)
            .find(|(param, slot)| slot.is_none() && !param.is_optional())
        {
            return Err(ResolutionError::MissingMandatoryParameter {
                name: missing.0.name().to_string(),
            });
        }

        let mut values = Vec::with_capacity(params.len());
        for (param, slot) in params.iter().zip(self.slots) {
            let value = match slot {
                Some(value) => value,
                None => param.default_value(&self.ctx).ok_or_else(|| {
                    ResolutionError::MissingMandatoryParameter {
                        name: param.name().to_string(),
                    }
                })??,
            };
            values.push(value);
        }
        Ok(CommandArgs::new(values))
    }
}

// --- RESOLVER ---

/// Drives one resolution through its [`Stage`]s.
#[derive(Debug)]
pub struct CommandLineResolver<'a> {
    namespace: &'a Namespace,
    working_directory: DirectoryId,
    stage: Stage,
}

impl<'a> CommandLineResolver<'a> {
    /// Starts a resolution from `working_directory`.
    pub fn new(namespace: &'a Namespace, working_directory: DirectoryId) -> Self {
        Self {
            namespace,
            working_directory,
            stage: Stage::Navigating,
        }
    }

    /// The current stage.
    pub fn stage(&self) -> Stage {
        self.stage
    }

    fn transition(&mut self, next: Stage) {
        log::trace!("Resolution stage {:?} -> {:?}", self.stage, next);
        self.stage = next;
    }

    fn track<T>(&mut self, result: Result<T, ResolutionError>) -> Result<T, ResolutionError> {
        if result.is_err() {
            self.transition(Stage::Failed);
        }
        result
    }

    /// Resolves the command token of the line.
    pub fn resolve_command(&mut self, token: &str) -> Result<CommandId, ResolutionError> {
        self.transition(Stage::Navigating);
        let split = namespace::split_command_path(token);
        let (directory_part, name) = self.track(split)?;
        let directory = match directory_part {
            Some(part) => {
                let walked = self.namespace.find_directory(self.working_directory, part);
                self.track(walked)?
            }
            None => self.working_directory,
        };

        self.transition(Stage::ResolvingCommand);
        let found = self
            .namespace
            .lookup_command(directory, name, directory_part.is_none());
        let id = self.track(found)?;
        self.transition(Stage::BindingParams);
        Ok(id)
    }

    /// A binder for `command`, parsing relative to the working directory.
    pub fn binder(&mut self, command: CommandId) -> Result<ParamBinder<'a>, ResolutionError> {
        let found = self.namespace.cmd(command);
        let command = self.track(found)?;
        Ok(ParamBinder::new(
            command,
            ParamContext::new(self.namespace, self.working_directory),
        ))
    }

    /// [`ParamBinder::bind`], moving to `Failed` on error.
    pub fn bind(&mut self, binder: &mut ParamBinder<'a>, token: &str) -> Result<(), ResolutionError> {
        let bound = binder.bind(token);
        self.track(bound)
    }

    /// [`ParamBinder::finish`], moving to `Done` on success.
    pub fn finish(&mut self, binder: ParamBinder<'a>) -> Result<CommandArgs, ResolutionError> {
        let finished = binder.finish();
        let args = self.track(finished)?;
        self.transition(Stage::Done);
        Ok(args)
    }
}

/// Resolves a full line for execution.
pub fn resolve_for_execute(
    namespace: &Namespace,
    working_directory: DirectoryId,
    raw_line: &str,
) -> Result<ExecutableCommand, ResolutionError> {
    let tokens = tokenizer::for_execute(raw_line)?;
    let (path, params) = tokens
        .split_first()
        .ok_or_else(|| ResolutionError::invalid_path("", "the command line is empty"))?;

    let mut resolver = CommandLineResolver::new(namespace, working_directory);
    let command = resolver.resolve_command(path)?;
    let mut binder = resolver.binder(command)?;
    for token in params {
        resolver.bind(&mut binder, token)?;
    }
    let args = resolver.finish(binder)?;
    log::debug!("Resolved '{}' with {} argument(s)", namespace.command_path(command), args.len());

    Ok(ExecutableCommand { command, args })
}

// MARK: --- UNIT TESTS ---
