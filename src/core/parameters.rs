// src/core/parameters.rs

//! # Parameter Model
//!
//! A [`ParamResolver`] turns a [`ParamDef`] into a [`CliParam`]: the definition plus its
//! parse and completion behaviour. The resolver is an explicit object handed to the
//! namespace builder; static value sets are compiled into tries once, at resolution time,
//! while dynamic value sets are re-read on every parse and completion.

use crate::core::args::{CommandRef, DirectoryRef, ParamValue};
use crate::core::completion::{CompletionKind, Suggestions};
use crate::core::errors::ResolutionError;
use crate::core::namespace::{DirectoryId, Namespace, PathTarget};
use crate::core::trie::{Trie, TrieError};
use crate::models::{DefinitionError, Identifier, ParamDef, ParamKind, Supplier, ValueSource};
use std::borrow::Cow;
use std::fmt;

const TRUE_LITERALS: &[&str] = &["true"];
const FALSE_LITERALS: &[&str] = &["false"];
const TRUE_ALIASES: &[&str] = &["yes", "on", "1"];
const FALSE_ALIASES: &[&str] = &["no", "off", "0"];

/// The live state a parameter may need while parsing or completing:
/// directory and command parameters are resolved relative to the working directory.
#[derive(Debug, Clone, Copy)]
pub struct ParamContext<'a> {
    namespace: &'a Namespace,
    working_directory: DirectoryId,
}

impl<'a> ParamContext<'a> {
    /// A context rooted at `working_directory`.
    pub fn new(namespace: &'a Namespace, working_directory: DirectoryId) -> Self {
        Self {
            namespace,
            working_directory,
        }
    }

    /// The namespace paths resolve in.
    pub fn namespace(&self) -> &'a Namespace {
        self.namespace
    }

    /// The directory relative paths start from.
    pub fn working_directory(&self) -> DirectoryId {
        self.working_directory
    }
}

/// Resolves parameter definitions into parseable, completable parameters.
#[derive(Debug, Clone, Default)]
pub struct ParamResolver {
    bool_aliases: bool,
}

impl ParamResolver {
    /// A resolver with strict `true`/`false` booleans.
    pub fn new() -> Self {
        Self::default()
    }

    /// Also accept `yes/no`, `on/off` and `1/0` for boolean parameters.
    pub fn with_bool_aliases(mut self, enabled: bool) -> Self {
        self.bool_aliases = enabled;
        self
    }

    /// Compiles `def`. Static value sets with duplicate values are rejected.
    pub fn resolve(&self, def: ParamDef) -> Result<CliParam, DefinitionError> {
        let values = match &def {
            ParamDef::String(string_def) => match string_def.values() {
                ValueSource::Unconstrained => ValueUniverse::Open,
                ValueSource::Static(values) if values.is_empty() => ValueUniverse::Open,
                ValueSource::Static(values) => {
                    let mut builder = Trie::builder();
                    for value in values {
                        builder.add(value.as_str(), ()).map_err(|e| match e {
                            TrieError::EmptyWord => DefinitionError::InvalidDefault {
                                name: def.name().to_string(),
                                value: String::new(),
                                reason: "accepted values must not be empty".to_string(),
                            },
                            TrieError::DuplicateWord { word } => DefinitionError::InvalidDefault {
                                name: def.name().to_string(),
                                value: word,
                                reason: "accepted values must be unique".to_string(),
                            },
                        })?;
                    }
                    ValueUniverse::Static(builder.build())
                }
                ValueSource::Dynamic(supplier) => ValueUniverse::Dynamic(supplier.clone()),
            },
            _ => ValueUniverse::Open,
        };
        log::trace!("Resolved parameter '{}' ({})", def.name(), def.kind());

        Ok(CliParam {
            def,
            values,
            bool_aliases: self.bool_aliases,
        })
    }
}

enum ValueUniverse {
    Open,
    Static(Trie<()>),
    Dynamic(Supplier<Vec<String>>),
}

impl ValueUniverse {
    /// The closed set of accepted values right now, or `None` when any value goes.
    fn current(&self) -> Option<Cow<'_, Trie<()>>> {
        match self {
            Self::Open => None,
            Self::Static(trie) => Some(Cow::Borrowed(trie)),
            Self::Dynamic(supplier) => {
                let values = supplier();
                if values.is_empty() {
                    None
                } else {
                    Some(Cow::Owned(values.into_iter().map(|v| (v, ())).collect()))
                }
            }
        }
    }
}

/// A parameter definition paired with its parse and completion behaviour.
pub struct CliParam {
    def: ParamDef,
    values: ValueUniverse,
    bool_aliases: bool,
}

impl fmt::Debug for CliParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CliParam")
            .field("def", &self.def)
            .field("bool_aliases", &self.bool_aliases)
            .finish_non_exhaustive()
    }
}

impl CliParam {
    /// The definition this parameter was compiled from.
    pub fn def(&self) -> &ParamDef {
        &self.def
    }

    /// Name and description.
    pub fn identifier(&self) -> &Identifier {
        self.def.identifier()
    }

    /// The parameter name.
    pub fn name(&self) -> &str {
        self.def.name()
    }

    /// The value type.
    pub fn kind(&self) -> ParamKind {
        self.def.kind()
    }

    /// Whether a default exists when the parameter is left unbound.
    pub fn is_optional(&self) -> bool {
        self.def.is_optional()
    }

    /// Numbers cannot be completed; every other kind can.
    pub fn is_completable(&self) -> bool {
        !matches!(self.kind(), ParamKind::Int | ParamKind::Double)
    }

    fn invalid(&self, raw: &str, reason: impl Into<String>) -> ResolutionError {
        ResolutionError::InvalidParamValue {
            name: self.name().to_string(),
            value: raw.to_string(),
            reason: reason.into(),
        }
    }

    fn bool_literals(&self) -> (Vec<&'static str>, Vec<&'static str>) {
        let mut truthy = TRUE_LITERALS.to_vec();
        let mut falsy = FALSE_LITERALS.to_vec();
        if self.bool_aliases {
            truthy.extend_from_slice(TRUE_ALIASES);
            falsy.extend_from_slice(FALSE_ALIASES);
        }
        (truthy, falsy)
    }

    fn parse_bool(&self, raw: &str) -> Option<bool> {
        let (truthy, falsy) = self.bool_literals();
        if truthy.iter().any(|t| t.eq_ignore_ascii_case(raw)) {
            Some(true)
        } else if falsy.iter().any(|f| f.eq_ignore_ascii_case(raw)) {
            Some(false)
        } else {
            None
        }
    }

    /// Parses a raw token into a value of this parameter's type.
    pub fn parse(&self, raw: &str, ctx: &ParamContext<'_>) -> Result<ParamValue, ResolutionError> {
        match &self.def {
            ParamDef::Int(_) => raw
                .parse::<i64>()
                .map(ParamValue::Int)
                .map_err(|e| self.invalid(raw, format!("not an integer ({e})"))),
            ParamDef::Double(_) => raw
                .parse::<f64>()
                .map(ParamValue::Double)
                .map_err(|e| self.invalid(raw, format!("not a number ({e})"))),
            ParamDef::Bool(_) | ParamDef::Toggle(_) => self
                .parse_bool(raw)
                .map(ParamValue::Bool)
                .ok_or_else(|| {
                    let (truthy, falsy) = self.bool_literals();
                    self.invalid(
                        raw,
                        format!("expected one of {}", [truthy, falsy].concat().join(", ")),
                    )
                }),
            ParamDef::String(_) => match self.values.current() {
                None => Ok(ParamValue::String(raw.to_string())),
                Some(accepted) => accepted
                    .get_entry(raw)
                    .map(|(word, _)| ParamValue::String(word.to_string()))
                    .ok_or_else(|| {
                        self.invalid(raw, format!("expected one of {}", accepted.words().join(", ")))
                    }),
            },
            ParamDef::Directory(_) => {
                let namespace = ctx.namespace();
                let id = namespace.find_directory(ctx.working_directory(), raw)?;
                Ok(ParamValue::Directory(DirectoryRef {
                    id,
                    path: namespace.directory_path(id),
                }))
            }
            ParamDef::Command(_) => {
                let namespace = ctx.namespace();
                let id = namespace.find_command(ctx.working_directory(), raw)?;
                Ok(ParamValue::Command(CommandRef {
                    id,
                    path: namespace.command_path(id),
                }))
            }
        }
    }

    /// The value used when no token was bound. `None` for mandatory parameters.
    /// Suppliers run now, so defaults may reflect live state.
    pub fn default_value(
        &self,
        ctx: &ParamContext<'_>,
    ) -> Option<Result<ParamValue, ResolutionError>> {
        match &self.def {
            ParamDef::Int(def) => def.default_supplier().map(|s| Ok(ParamValue::Int(s()))),
            ParamDef::Double(def) => def.default_supplier().map(|s| Ok(ParamValue::Double(s()))),
            ParamDef::Bool(def) => def.default_supplier().map(|s| Ok(ParamValue::Bool(s()))),
            ParamDef::String(def) => def.default_supplier().map(|s| Ok(ParamValue::String(s()))),
            ParamDef::Directory(def) | ParamDef::Command(def) => {
                def.default_supplier().map(|s| self.parse(&s(), ctx))
            }
            ParamDef::Toggle(def) => Some(Ok(ParamValue::Bool(def.toggled()))),
        }
    }

    /// Completion candidates for a partially typed value.
    pub fn complete(
        &self,
        prefix: &str,
        ctx: &ParamContext<'_>,
    ) -> Result<Suggestions, ResolutionError> {
        match &self.def {
            ParamDef::Int(_) | ParamDef::Double(_) => Ok(Suggestions::empty(prefix)),
            ParamDef::Bool(_) | ParamDef::Toggle(_) => {
                let (truthy, falsy) = self.bool_literals();
                let candidates: Trie<CompletionKind> = truthy
                    .into_iter()
                    .chain(falsy)
                    .map(|literal| (literal, CompletionKind::ParamValue))
                    .collect();
                Ok(Suggestions::new("", prefix, candidates.sub_trie(prefix)))
            }
            ParamDef::String(_) => Ok(match self.values.current() {
                None => Suggestions::empty(prefix),
                Some(accepted) => Suggestions::new(
                    "",
                    prefix,
                    accepted
                        .sub_trie(prefix)
                        .map_values(|_| CompletionKind::ParamValue),
                ),
            }),
            ParamDef::Directory(_) => ctx.namespace().complete_path(
                ctx.working_directory(),
                prefix,
                PathTarget::Directories,
            ),
            ParamDef::Command(_) => ctx.namespace().complete_path(
                ctx.working_directory(),
                prefix,
                PathTarget::Commands,
            ),
        }
    }
}

// MARK: --- UNIT TESTS ---

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::test_support::sample_namespace;
    use crate::models::{StringParamDef, ToggleParamDef, ValueParamDef};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};

    fn id(name: &str) -> Identifier {
        Identifier::new(name, "").unwrap()
    }

    fn resolve(def: impl Into<ParamDef>) -> CliParam {
        ParamResolver::new().resolve(def.into()).unwrap()
    }

    #[test]
    fn test_parse_numbers() {
        let ns = sample_namespace();
        let ctx = ParamContext::new(&ns, ns.root());
        let int = resolve(ParamDef::Int(ValueParamDef::new(id("n"))));
        assert_eq!(int.parse("42", &ctx).unwrap(), ParamValue::Int(42));
        assert!(matches!(
            int.parse("4x", &ctx),
            Err(ResolutionError::InvalidParamValue { .. })
        ));

        let double = resolve(ParamDef::Double(ValueParamDef::new(id("d"))));
        assert_eq!(double.parse("2.5", &ctx).unwrap(), ParamValue::Double(2.5));
        assert!(!double.is_completable());
        assert!(double.complete("2", &ctx).unwrap().is_empty());
    }

    #[test]
    fn test_parse_bool_with_and_without_aliases() {
        let ns = sample_namespace();
        let ctx = ParamContext::new(&ns, ns.root());
        let def = ParamDef::Bool(ValueParamDef::new(id("b")));

        let strict = ParamResolver::new().resolve(def.clone()).unwrap();
        assert_eq!(strict.parse("TRUE", &ctx).unwrap(), ParamValue::Bool(true));
        assert!(strict.parse("yes", &ctx).is_err());

        let relaxed = ParamResolver::new()
            .with_bool_aliases(true)
            .resolve(def)
            .unwrap();
        assert_eq!(relaxed.parse("yes", &ctx).unwrap(), ParamValue::Bool(true));
        assert_eq!(relaxed.parse("off", &ctx).unwrap(), ParamValue::Bool(false));
    }

    #[test]
    fn test_static_values_validate_and_complete() {
        let ns = sample_namespace();
        let ctx = ParamContext::new(&ns, ns.root());
        let param = resolve(
            StringParamDef::new(id("level")).with_static_values(["debug", "info", "Warn"]),
        );

        assert_eq!(
            param.parse("warn", &ctx).unwrap(),
            ParamValue::String("Warn".to_string())
        );
        assert!(matches!(
            param.parse("trace", &ctx),
            Err(ResolutionError::InvalidParamValue { .. })
        ));

        let completions = param.complete("d", &ctx).unwrap();
        assert_eq!(completions.candidates().words(), vec!["debug"]);
    }

    #[test]
    fn test_static_values_must_be_unique() {
        let def = StringParamDef::new(id("x")).with_static_values(["a", "A"]);
        assert!(ParamResolver::new().resolve(def.into()).is_err());
    }

    #[test]
    fn test_dynamic_values_are_read_lazily() {
        let ns = sample_namespace();
        let ctx = ParamContext::new(&ns, ns.root());
        let live = Arc::new(Mutex::new(vec!["alpha".to_string()]));
        let source = Arc::clone(&live);
        let param = resolve(
            StringParamDef::new(id("name"))
                .with_dynamic_values(move || source.lock().map(|v| v.clone()).unwrap_or_default()),
        );

        assert!(param.parse("beta", &ctx).is_err());
        live.lock().unwrap().push("beta".to_string());
        assert!(param.parse("beta", &ctx).is_ok());

        // An empty set means unconstrained.
        live.lock().unwrap().clear();
        assert!(param.parse("anything", &ctx).is_ok());
    }

    #[test]
    fn test_defaults_are_supplied_lazily() {
        let ns = sample_namespace();
        let ctx = ParamContext::new(&ns, ns.root());
        let mandatory = resolve(ParamDef::Int(ValueParamDef::new(id("a"))));
        assert!(mandatory.default_value(&ctx).is_none());

        let optional = resolve(StringParamDef::new(id("b")).with_default_value("x"));
        assert_eq!(
            optional.default_value(&ctx).unwrap().unwrap(),
            ParamValue::String("x".to_string())
        );
    }

    #[test]
    fn test_toggle_default_negates_live_state() {
        let ns = sample_namespace();
        let ctx = ParamContext::new(&ns, ns.root());
        let state = Arc::new(AtomicBool::new(false));
        let reader = Arc::clone(&state);
        let toggle = resolve(ToggleParamDef::new(id("value"), move || {
            reader.load(Ordering::SeqCst)
        }));

        assert_eq!(toggle.default_value(&ctx).unwrap().unwrap(), ParamValue::Bool(true));
        state.store(true, Ordering::SeqCst);
        assert_eq!(toggle.default_value(&ctx).unwrap().unwrap(), ParamValue::Bool(false));
    }

    #[test]
    fn test_directory_param_parses_and_completes_paths() {
        let ns = sample_namespace();
        let ctx = ParamContext::new(&ns, ns.root());
        let param = resolve(ParamDef::Directory(
            ValueParamDef::new(id("path")).with_default_value(".".to_string()),
        ));

        match param.parse("net/tools/", &ctx).unwrap() {
            ParamValue::Directory(dir) => assert_eq!(dir.path, "/net/tools"),
            other => panic!("unexpected value {other:?}"),
        }
        match param.default_value(&ctx).unwrap().unwrap() {
            ParamValue::Directory(dir) => assert_eq!(dir.path, "/"),
            other => panic!("unexpected value {other:?}"),
        }
        assert!(matches!(
            param.parse("nope", &ctx),
            Err(ResolutionError::DirectoryNotFound { .. })
        ));

        let completions = param.complete("net/t", &ctx).unwrap();
        assert_eq!(completions.replace_prefix(), "net/");
        assert_eq!(completions.candidates().words(), vec!["tools"]);
    }
}
