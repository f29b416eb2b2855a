// src/core/assist.rs

//! # Assist
//!
//! Resolves a partially typed line and produces completion candidates for the token under
//! the cursor. Unlike execution, assistance never fails outright: a resolution error is
//! carried in the result next to whatever suggestions and bound parameters were gathered
//! before it happened.

use crate::constants::PARAM_VALUE_DELIMITER;
use crate::core::command_line::{self, BoundParam, CommandLineResolver, ParamBinder, Stage};
use crate::core::completion::{CompletionKind, CompletionState, Suggestions};
use crate::core::errors::{ErrorKind, ResolutionError};
use crate::core::namespace::{Command, CommandId, DirectoryId, Namespace, PathTarget};
use crate::core::tokenizer;
use crate::core::trie::Trie;
use serde::Serialize;
use std::collections::BTreeMap;

/// Everything an embedder needs to render assistance for one line.
#[derive(Debug, Clone, Default)]
pub struct AssistResult {
    /// Candidates for the token under the cursor.
    pub suggestions: Suggestions,
    /// How far resolution got.
    pub stage: Stage,
    /// The resolved command, once the command token is complete.
    pub command: Option<CommandId>,
    /// Absolute path of `command`.
    pub command_path: Option<String>,
    /// Parameters bound by the complete tokens before the cursor.
    pub bound_params: Vec<BoundParam>,
    /// The parameter the token under the cursor would bind to.
    pub current_param: Option<usize>,
    /// The first failure, if any. Suggestions gathered before it are kept.
    pub error: Option<ResolutionError>,
}

impl AssistResult {
    fn failed(typed: &str, error: ResolutionError) -> Self {
        Self {
            suggestions: Suggestions::empty(typed),
            stage: Stage::Failed,
            error: Some(error),
            ..Self::default()
        }
    }
}

/// Assists `raw_line` as typed up to `cursor` (a char index; text after it is ignored).
pub fn resolve_for_assist(
    namespace: &Namespace,
    working_directory: DirectoryId,
    raw_line: &str,
    cursor: usize,
) -> AssistResult {
    let line: String = raw_line.chars().take(cursor).collect();
    let tokens = match tokenizer::for_assist(&line) {
        Ok(tokens) => tokens,
        Err(e) => return AssistResult::failed("", e.into()),
    };
    let Some((current, prior)) = tokens.split_last() else {
        return AssistResult::failed(
            "",
            ResolutionError::InternalError("assist produced no tokens".to_string()),
        );
    };

    // --- 1. STILL TYPING THE COMMAND PATH ---
    let Some((path, param_tokens)) = prior.split_first() else {
        return match namespace.complete_path(working_directory, current, PathTarget::Commands) {
            Ok(suggestions) => AssistResult {
                suggestions,
                ..AssistResult::default()
            },
            Err(e) => AssistResult::failed(current, e),
        };
    };

    // --- 2. RESOLVE THE COMMAND AND BIND THE COMPLETE TOKENS ---
    let mut resolver = CommandLineResolver::new(namespace, working_directory);
    let command_id = match resolver.resolve_command(path) {
        Ok(id) => id,
        Err(e) => return AssistResult::failed(current, e),
    };
    let mut binder = match resolver.binder(command_id) {
        Ok(binder) => binder,
        Err(e) => return AssistResult::failed(current, e),
    };
    let mut result = AssistResult {
        command: Some(command_id),
        command_path: Some(namespace.command_path(command_id)),
        ..AssistResult::default()
    };
    for token in param_tokens {
        if let Err(e) = resolver.bind(&mut binder, token) {
            result.suggestions = Suggestions::empty(current.as_str());
            result.bound_params = binder.bound();
            result.stage = resolver.stage();
            result.error = Some(e);
            return result;
        }
    }

    // --- 3. COMPLETE THE TOKEN UNDER THE CURSOR ---
    let completion = complete_param_token(&binder, current);
    result.suggestions = completion.suggestions;
    result.current_param = completion.param;
    result.bound_params = binder.bound();
    result.stage = if completion.error.is_some() {
        Stage::Failed
    } else {
        resolver.stage()
    };
    result.error = completion.error;
    result
}

struct TokenCompletion {
    suggestions: Suggestions,
    param: Option<usize>,
    error: Option<ResolutionError>,
}

impl TokenCompletion {
    fn new(suggestions: Suggestions, param: Option<usize>) -> Self {
        Self {
            suggestions,
            param,
            error: None,
        }
    }

    fn failing(suggestions: Suggestions, param: Option<usize>, error: ResolutionError) -> Self {
        Self {
            suggestions,
            param,
            error: Some(error),
        }
    }
}

/// `name=` for every parameter that is still unbound.
fn unbound_param_names(command: &Command, binder: &ParamBinder<'_>) -> Trie<CompletionKind> {
    command
        .params()
        .iter()
        .enumerate()
        .filter(|(index, _)| !binder.is_bound(*index))
        .map(|(_, param)| {
            (
                format!("{}{PARAM_VALUE_DELIMITER}", param.name()),
                CompletionKind::ParamName,
            )
        })
        .collect()
}

fn complete_param_token(binder: &ParamBinder<'_>, current: &str) -> TokenCompletion {
    let command = binder.command();
    let ctx = binder.context();

    if let Some((name, value)) = command_line::split_named(current) {
        let Some(index) = command.param_index(name) else {
            let error = ResolutionError::InvalidParamName {
                command: command.name().to_string(),
                name: name.to_string(),
            };
            return TokenCompletion::failing(Suggestions::empty(current), None, error);
        };
        let Some(param) = command.param(index) else {
            let error = ResolutionError::InternalError(format!("parameter index {index} out of range"));
            return TokenCompletion::failing(Suggestions::empty(current), None, error);
        };
        if binder.is_bound(index) {
            let error = ResolutionError::ParamAlreadyBound {
                name: param.name().to_string(),
            };
            return TokenCompletion::failing(Suggestions::empty(value), Some(index), error);
        }
        if !param.is_completable() {
            let error = ResolutionError::AutoCompleteNotPossible {
                name: param.name().to_string(),
            };
            return TokenCompletion::failing(Suggestions::empty(value), Some(index), error);
        }
        let outer = current.strip_suffix(value).unwrap_or_default();
        return match param.complete(value, ctx) {
            Ok(suggestions) => TokenCompletion::new(suggestions.with_outer_prefix(outer), Some(index)),
            Err(e) => TokenCompletion::failing(Suggestions::empty(value), Some(index), e),
        };
    }

    let names = Suggestions::new(
        "",
        current,
        unbound_param_names(command, binder).sub_trie(current),
    );
    let Some(index) = binder.next_positional() else {
        if current.is_empty() {
            return TokenCompletion::new(names, None);
        }
        let error = ResolutionError::ExcessArguments {
            command: command.name().to_string(),
            expected: command.params().len(),
            token: current.to_string(),
        };
        return TokenCompletion::failing(names, None, error);
    };
    let Some(param) = command.param(index) else {
        let error = ResolutionError::InternalError(format!("parameter index {index} out of range"));
        return TokenCompletion::failing(names, None, error);
    };

    let values = match param.complete(current, ctx) {
        Ok(values) => values,
        Err(e) => return TokenCompletion::failing(names, Some(index), e),
    };
    let merged = values.merge(names);
    if !param.is_completable() && merged.is_empty() {
        let error = ResolutionError::AutoCompleteNotPossible {
            name: param.name().to_string(),
        };
        return TokenCompletion::failing(merged, Some(index), error);
    }
    TokenCompletion::new(merged, Some(index))
}

// --- REPORT ---

/// A self-contained, serializable view of an [`AssistResult`].
#[derive(Debug, Clone, Serialize)]
pub struct AssistReport {
    /// The part of the token being completed.
    pub typed: String,
    /// The part of the token that stays as typed.
    pub replace_prefix: String,
    /// How close `typed` is to the candidates.
    pub completion: CompletionState,
    /// Candidate words grouped by kind.
    pub candidates: BTreeMap<CompletionKind, Vec<String>>,
    /// How far resolution got.
    pub stage: Stage,
    /// Path of the resolved command.
    pub command: Option<String>,
    /// Usage line of the resolved command.
    pub usage: Option<String>,
    /// Name of the parameter at the cursor.
    pub current_param: Option<String>,
    /// Parameters bound so far.
    pub bound_params: Vec<BoundParam>,
    /// Kind of the first failure.
    pub error_kind: Option<ErrorKind>,
    /// Message of the first failure.
    pub error: Option<String>,
}

impl AssistReport {
    /// Renders `result`, resolving ids against `namespace`.
    pub fn new(namespace: &Namespace, result: &AssistResult) -> Self {
        let command = result.command.and_then(|id| namespace.command(id));
        let current_param = command
            .zip(result.current_param)
            .and_then(|(command, index)| command.param(index))
            .map(|param| param.name().to_string());
        let candidates = result
            .suggestions
            .grouped()
            .into_iter()
            .map(|(kind, words)| (kind, words.into_iter().map(str::to_string).collect()))
            .collect();

        Self {
            typed: result.suggestions.typed().to_string(),
            replace_prefix: result.suggestions.replace_prefix().to_string(),
            completion: result.suggestions.state(),
            candidates,
            stage: result.stage,
            command: result.command_path.clone(),
            usage: command.map(Command::usage),
            current_param,
            bound_params: result.bound_params.clone(),
            error_kind: result.error.as_ref().map(ResolutionError::kind),
            error: result.error.as_ref().map(ToString::to_string),
        }
    }
}

// MARK: --- UNIT TESTS ---

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::args::ParamValue;
    use crate::core::test_support::sample_namespace;

    fn assist(line: &str) -> AssistResult {
        let ns = sample_namespace();
        resolve_for_assist(&ns, ns.root(), line, line.chars().count())
    }

    fn words(result: &AssistResult) -> Vec<String> {
        result
            .suggestions
            .candidates()
            .words()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_empty_line_lists_working_directory_and_globals() {
        let result = assist("");
        assert!(result.error.is_none());
        assert_eq!(words(&result), vec!["echo", "foo", "net", "pwd", "verbose"]);
        assert_eq!(
            result.suggestions.by_kind(CompletionKind::Directory),
            vec!["foo", "net"]
        );
    }

    #[test]
    fn test_partial_path_completion() {
        let result = assist("net/to");
        assert_eq!(result.suggestions.replace_prefix(), "net/");
        assert_eq!(
            result.suggestions.state(),
            CompletionState::Partial {
                word: "tools".to_string()
            }
        );
    }

    #[test]
    fn test_param_names_after_command() {
        let result = assist("net/tools/ping ");
        assert!(result.error.is_none());
        assert_eq!(result.current_param, Some(0));
        assert_eq!(result.command_path.as_deref(), Some("/net/tools/ping"));
        // `host` is an open string: only names are offered.
        assert_eq!(words(&result), vec!["count=", "host="]);
    }

    #[test]
    fn test_bound_params_are_reported_and_not_offered() {
        let result = assist("net/tools/ping host=example ");
        assert_eq!(result.bound_params.len(), 1);
        assert_eq!(
            result.bound_params[0].value,
            ParamValue::String("example".to_string())
        );
        assert_eq!(result.current_param, Some(1));
        assert_eq!(words(&result), vec!["count="]);
    }

    #[test]
    fn test_numeric_param_cannot_be_completed() {
        let result = assist("net/tools/ping count=");
        assert_eq!(
            result.error.as_ref().map(ResolutionError::kind),
            Some(ErrorKind::AutoCompleteNotPossible)
        );
        assert_eq!(result.stage, Stage::Failed);
    }

    #[test]
    fn test_toggle_values_are_suggested() {
        let result = assist("verbose ");
        assert!(result.error.is_none());
        assert_eq!(words(&result), vec!["false", "true", "value="]);

        let named = assist("verbose value=t");
        assert_eq!(named.suggestions.replace_prefix(), "value=");
        assert_eq!(words(&named), vec!["true"]);
    }

    #[test]
    fn test_errors_are_carried_not_raised() {
        let unknown = assist("net/nope ");
        assert_eq!(
            unknown.error.as_ref().map(ResolutionError::kind),
            Some(ErrorKind::CommandNotFound)
        );
        assert!(unknown.suggestions.is_empty());

        let excess = assist("echo hi there");
        assert_eq!(
            excess.error.as_ref().map(ResolutionError::kind),
            Some(ErrorKind::ExcessArguments)
        );
        assert_eq!(excess.bound_params.len(), 1);

        let empty = assist("foo/bar/baz/");
        assert_eq!(
            empty.error.as_ref().map(ResolutionError::kind),
            Some(ErrorKind::EmptyDirectory)
        );
    }

    #[test]
    fn test_cursor_truncates_the_line() {
        let ns = sample_namespace();
        let result = resolve_for_assist(&ns, ns.root(), "ne whatever", 2);
        assert_eq!(words(&result), vec!["net"]);
    }

    #[test]
    fn test_report_serializes_to_json() {
        let ns = sample_namespace();
        let result = resolve_for_assist(&ns, ns.root(), "net/tools/ping ", 15);
        let report = AssistReport::new(&ns, &result);
        assert_eq!(report.usage.as_deref(), Some("ping <host:string> [count:int]"));
        assert_eq!(report.current_param.as_deref(), Some("host"));

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["stage"], "binding_params");
        assert_eq!(json["candidates"]["param_name"][0], "count=");
    }
}
