// src/core/args.rs

//! Parsed parameter values and the queue an executor consumes them from.

use crate::core::namespace::{CommandId, DirectoryId};
use serde::Serialize;
use std::collections::VecDeque;
use std::fmt;
use thiserror::Error;

/// A failed [`CommandArgs::pop`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandArgsError {
    /// Every value was consumed already.
    #[error("Expected a {expected} argument, but no arguments are left.")]
    Exhausted {
        /// The requested type.
        expected: &'static str,
    },
    /// The next value has another type. It stays in the queue.
    #[error("Expected a {expected} argument, found {found} '{value}'.")]
    TypeMismatch {
        /// The requested type.
        expected: &'static str,
        /// The type of the value found.
        found: &'static str,
        /// The value found, displayed.
        value: String,
    },
}

/// A directory bound to a parameter, with its absolute path at resolution time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectoryRef {
    /// The directory in the namespace it was resolved against.
    pub id: DirectoryId,
    /// Its absolute path.
    pub path: String,
}

/// A command bound to a parameter, with its absolute path at resolution time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandRef {
    /// The command in the namespace it was resolved against.
    pub id: CommandId,
    /// Its absolute path, or the bare name of a global command.
    pub path: String,
}

/// A parsed parameter value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// A 64-bit integer.
    Int(i64),
    /// A 64-bit float.
    Double(f64),
    /// A boolean.
    Bool(bool),
    /// Free text or a member of a value set.
    String(String),
    /// A resolved directory.
    Directory(DirectoryRef),
    /// A resolved command.
    Command(CommandRef),
}

impl ParamValue {
    /// The parameter type name of this value, as shown in usages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Int(_) => "int",
            Self::Double(_) => "double",
            Self::Bool(_) => "bool",
            Self::String(_) => "string",
            Self::Directory(_) => "directory",
            Self::Command(_) => "command",
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(value) => write!(f, "{value}"),
            Self::Double(value) => write!(f, "{value}"),
            Self::Bool(value) => write!(f, "{value}"),
            Self::String(value) => f.write_str(value),
            Self::Directory(dir) => f.write_str(&dir.path),
            Self::Command(cmd) => f.write_str(&cmd.path),
        }
    }
}

/// Conversion out of a [`ParamValue`], used by [`CommandArgs::pop`].
pub trait FromParamValue: Sized {
    /// The type name reported on a mismatch.
    const TYPE_NAME: &'static str;

    /// Returns the original value back when it has another type.
    fn from_param_value(value: ParamValue) -> Result<Self, ParamValue>;
}

macro_rules! impl_from_param_value {
    ($ty:ty, $variant:ident, $name:literal) => {
        impl FromParamValue for $ty {
            const TYPE_NAME: &'static str = $name;

            fn from_param_value(value: ParamValue) -> Result<Self, ParamValue> {
                match value {
                    ParamValue::$variant(inner) => Ok(inner),
                    other => Err(other),
                }
            }
        }
    };
}

impl_from_param_value!(i64, Int, "int");
impl_from_param_value!(f64, Double, "double");
impl_from_param_value!(bool, Bool, "bool");
impl_from_param_value!(String, String, "string");
impl_from_param_value!(DirectoryRef, Directory, "directory");
impl_from_param_value!(CommandRef, Command, "command");

impl FromParamValue for ParamValue {
    const TYPE_NAME: &'static str = "any";

    fn from_param_value(value: ParamValue) -> Result<Self, ParamValue> {
        Ok(value)
    }
}

/// The bound values of one invocation, one per declared parameter, in declaration order.
/// Consumed front to back by the executor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandArgs {
    values: VecDeque<ParamValue>,
}

impl CommandArgs {
    /// Wraps values in declaration order.
    pub fn new(values: Vec<ParamValue>) -> Self {
        Self {
            values: values.into(),
        }
    }

    /// How many values are left.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether every value was consumed.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The values not consumed yet.
    pub fn remaining(&self) -> impl Iterator<Item = &ParamValue> {
        self.values.iter()
    }

    /// Pops the next value, expecting it to be a `T`. On a mismatch the value stays in place.
    pub fn pop<T: FromParamValue>(&mut self) -> Result<T, CommandArgsError> {
        let value = self.values.pop_front().ok_or(CommandArgsError::Exhausted {
            expected: T::TYPE_NAME,
        })?;
        T::from_param_value(value).map_err(|value| {
            let error = CommandArgsError::TypeMismatch {
                expected: T::TYPE_NAME,
                found: value.type_name(),
                value: value.to_string(),
            };
            self.values.push_front(value);
            error
        })
    }

    /// [`Self::pop`] for a `int` parameter.
    pub fn pop_int(&mut self) -> Result<i64, CommandArgsError> {
        self.pop()
    }

    /// [`Self::pop`] for a `double` parameter.
    pub fn pop_double(&mut self) -> Result<f64, CommandArgsError> {
        self.pop()
    }

    /// [`Self::pop`] for a `bool` parameter.
    pub fn pop_bool(&mut self) -> Result<bool, CommandArgsError> {
        self.pop()
    }

    /// [`Self::pop`] for a `string` parameter.
    pub fn pop_string(&mut self) -> Result<String, CommandArgsError> {
        self.pop()
    }

    /// [`Self::pop`] for a `directory` parameter.
    pub fn pop_directory(&mut self) -> Result<DirectoryRef, CommandArgsError> {
        self.pop()
    }

    /// [`Self::pop`] for a `command` parameter.
    pub fn pop_command(&mut self) -> Result<CommandRef, CommandArgsError> {
        self.pop()
    }
}

// MARK: --- UNIT TESTS ---

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pop_in_declaration_order() {
        let mut args = CommandArgs::new(vec![
            ParamValue::Int(5),
            ParamValue::String("x".to_string()),
            ParamValue::Bool(true),
        ]);
        assert_eq!(args.pop_int().unwrap(), 5);
        assert_eq!(args.pop_string().unwrap(), "x");
        assert!(args.pop_bool().unwrap());
        assert!(args.is_empty());
    }

    #[test]
    fn test_pop_past_end_fails() {
        let mut args = CommandArgs::default();
        assert_eq!(
            args.pop_int().unwrap_err(),
            CommandArgsError::Exhausted { expected: "int" }
        );
    }

    #[test]
    fn test_type_mismatch_keeps_value() {
        let mut args = CommandArgs::new(vec![ParamValue::String("abc".to_string())]);
        let err = args.pop_double().unwrap_err();
        assert_eq!(
            err,
            CommandArgsError::TypeMismatch {
                expected: "double",
                found: "string",
                value: "abc".to_string()
            }
        );
        assert_eq!(args.len(), 1);
        assert_eq!(args.pop::<ParamValue>().unwrap().to_string(), "abc");
    }
}
