// src/core/errors.rs

//! The failures a command line can run into while it is resolved.

use crate::core::tokenizer::TokenizeError;
use serde::Serialize;
use thiserror::Error;

/// The kind of a resolution or execution failure, without its details.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    /// A path is malformed (empty segment, trailing delimiter on a command).
    InvalidPath,
    /// A path segment names no child directory.
    DirectoryNotFound,
    /// The last path segment names no command.
    CommandNotFound,
    /// A directory has nothing to list or complete.
    EmptyDirectory,
    /// A `name=value` token names no parameter of the command.
    InvalidParamName,
    /// A parameter received a second value.
    ParamAlreadyBound,
    /// A parameter without default was left unbound.
    MissingMandatoryParameter,
    /// A token could not be parsed as the parameter's type or value set.
    InvalidParamValue,
    /// More tokens than the command has parameters.
    ExcessArguments,
    /// The current parameter offers no completions (numbers).
    AutoCompleteNotPossible,
    /// The executor of a resolved command failed.
    CommandExecutionFailure,
    /// An engine invariant was violated.
    InternalError,
}

/// A failure while resolving a command line against the namespace.
///
/// Everything except `InternalError` is user-facing and recoverable.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    /// See [`ErrorKind::InvalidPath`].
    #[error("Invalid path '{path}': {reason}.")]
    InvalidPath {
        /// The offending path as typed.
        path: String,
        /// Why it was rejected.
        reason: &'static str,
    },
    /// See [`ErrorKind::DirectoryNotFound`].
    #[error("Directory '{name}' not found in '{parent}'.")]
    DirectoryNotFound {
        /// The segment that matched nothing.
        name: String,
        /// Absolute path of the directory searched.
        parent: String,
    },
    /// See [`ErrorKind::CommandNotFound`].
    #[error("Command '{name}' not found in '{directory}'.")]
    CommandNotFound {
        /// The command name that matched nothing.
        name: String,
        /// Absolute path of the directory searched.
        directory: String,
    },
    /// See [`ErrorKind::EmptyDirectory`].
    #[error("Directory '{path}' is empty.")]
    EmptyDirectory {
        /// Absolute path of the empty directory.
        path: String,
    },
    /// See [`ErrorKind::InvalidParamName`].
    #[error("Command '{command}' has no parameter named '{name}'.")]
    InvalidParamName {
        /// The command being bound.
        command: String,
        /// The unknown name.
        name: String,
    },
    /// See [`ErrorKind::ParamAlreadyBound`].
    #[error("Parameter '{name}' is already bound.")]
    ParamAlreadyBound {
        /// The parameter bound twice.
        name: String,
    },
    /// See [`ErrorKind::MissingMandatoryParameter`].
    #[error("Missing mandatory parameter '{name}'.")]
    MissingMandatoryParameter {
        /// The first unbound mandatory parameter.
        name: String,
    },
    /// See [`ErrorKind::InvalidParamValue`].
    #[error("Invalid value '{value}' for parameter '{name}': {reason}.")]
    InvalidParamValue {
        /// The parameter being parsed.
        name: String,
        /// The raw token.
        value: String,
        /// Why parsing failed.
        reason: String,
    },
    /// See [`ErrorKind::ExcessArguments`].
    #[error("Command '{command}' takes {expected} argument(s), '{token}' is one too many.")]
    ExcessArguments {
        /// The command being bound.
        command: String,
        /// How many parameters it declares.
        expected: usize,
        /// The first token left over.
        token: String,
    },
    /// See [`ErrorKind::AutoCompleteNotPossible`].
    #[error("Values of parameter '{name}' cannot be auto-completed.")]
    AutoCompleteNotPossible {
        /// The parameter at the cursor.
        name: String,
    },
    /// See [`ErrorKind::InternalError`].
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ResolutionError {
    /// The kind of this error, for matching without destructuring.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidPath { .. } => ErrorKind::InvalidPath,
            Self::DirectoryNotFound { .. } => ErrorKind::DirectoryNotFound,
            Self::CommandNotFound { .. } => ErrorKind::CommandNotFound,
            Self::EmptyDirectory { .. } => ErrorKind::EmptyDirectory,
            Self::InvalidParamName { .. } => ErrorKind::InvalidParamName,
            Self::ParamAlreadyBound { .. } => ErrorKind::ParamAlreadyBound,
            Self::MissingMandatoryParameter { .. } => ErrorKind::MissingMandatoryParameter,
            Self::InvalidParamValue { .. } => ErrorKind::InvalidParamValue,
            Self::ExcessArguments { .. } => ErrorKind::ExcessArguments,
            Self::AutoCompleteNotPossible { .. } => ErrorKind::AutoCompleteNotPossible,
            Self::InternalError(_) => ErrorKind::InternalError,
        }
    }

    pub(crate) fn invalid_path(path: &str, reason: &'static str) -> Self {
        Self::InvalidPath {
            path: path.to_string(),
            reason,
        }
    }
}

impl From<TokenizeError> for ResolutionError {
    fn from(error: TokenizeError) -> Self {
        Self::InternalError(error.to_string())
    }
}
