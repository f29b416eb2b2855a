// src/system/definitions.rs

//! # Declarative Definitions
//!
//! Builds a [`DirectoryDef`] tree from `[[directories]]` and `[[commands]]` entries of a
//! TOML document. Intermediate directories are created on demand. A declarative command
//! prints its `output` template with every `{param}` placeholder replaced by the bound
//! value.

use crate::constants::PATH_DELIMITER;
use crate::core::args::ParamValue;
use crate::core::trie::fold_word;
use crate::models::{
    CommandDef, DefinitionError, DirectoryDef, DirectoryDefBuilder, Identifier, ParamDef,
    StringParamDef, ValueParamDef,
};
use lazy_static::lazy_static;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

lazy_static! {
    static ref PLACEHOLDER_RE: Regex =
        Regex::new(r"\{([^{}]+)\}").expect("placeholder pattern is valid");
}

/// Declarative entries that do not form a valid definition tree.
#[derive(Error, Debug)]
pub enum DefinitionsError {
    /// A `path` is empty or has an empty segment.
    #[error("Invalid definition path '{path}': {reason}.")]
    InvalidPath {
        /// The path as written.
        path: String,
        /// What is wrong with it.
        reason: &'static str,
    },
    /// A name or a parameter list was rejected by the model builders.
    #[error(transparent)]
    Definition(#[from] DefinitionError),
    /// A `default` has a TOML type that does not match the parameter `type`.
    #[error("Default of parameter '{param}' in '{command}' must be a {expected}, found '{found}'.")]
    DefaultType {
        /// Path of the command.
        command: String,
        /// The parameter name.
        param: String,
        /// The type the default should have.
        expected: &'static str,
        /// The default as written.
        found: String,
    },
}

/// The type of a declaratively defined parameter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    /// `int`
    Int,
    /// `double`
    Double,
    /// `bool`
    Bool,
    /// `string`, the default.
    #[default]
    String,
    /// `directory`
    Directory,
    /// `command`
    Command,
}

/// A `[[directories]]` entry. Declares a directory that may stay empty.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DirectorySpec {
    /// Slash-separated path from the root, e.g. `net/tools`.
    pub path: String,
    /// Free text describing the directory.
    #[serde(default)]
    pub description: String,
}

/// A `[[commands.params]]` entry.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ParamSpec {
    /// The parameter name.
    pub name: String,
    /// Free text.
    #[serde(default)]
    pub description: String,
    /// The `type` key, `string` when omitted.
    #[serde(rename = "type", default)]
    pub kind: ParamType,
    /// Makes the parameter optional.
    #[serde(default)]
    pub default: Option<toml::Value>,
    /// Accepted values of a string parameter.
    #[serde(default)]
    pub values: Vec<String>,
}

/// A `[[commands]]` entry.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CommandSpec {
    /// Full path of the command, e.g. `net/ping`.
    pub path: String,
    /// Shown by `man`.
    #[serde(default)]
    pub description: String,
    /// Printed on execution, with `{param}` placeholders filled in.
    #[serde(default)]
    pub output: Option<String>,
    /// Parameters in declaration order.
    #[serde(default)]
    pub params: Vec<ParamSpec>,
}

// --- TREE ASSEMBLY ---

#[derive(Default)]
struct DirectoryNode {
    name: String,
    description: String,
    /// Keyed by folded name so differently cased paths meet in one node.
    directories: BTreeMap<String, DirectoryNode>,
    commands: Vec<CommandDef>,
}

impl DirectoryNode {
    fn descend(&mut self, segments: &[&str]) -> &mut Self {
        let mut node = self;
        for segment in segments {
            node = node
                .directories
                .entry(fold_word(segment))
                .or_insert_with(|| Self {
                    name: (*segment).to_string(),
                    ..Self::default()
                });
        }
        node
    }

    fn into_def(self, mut builder: DirectoryDefBuilder) -> Result<DirectoryDef, DefinitionsError> {
        for child in self.directories.into_values() {
            let identifier = Identifier::new(child.name.as_str(), child.description.as_str())?;
            let def = child.into_def(DirectoryDef::builder(identifier))?;
            builder.add_directory(def)?;
        }
        for command in self.commands {
            builder.add_command(command)?;
        }
        Ok(builder.build())
    }
}

fn split_path(path: &str) -> Result<Vec<&str>, DefinitionsError> {
    let invalid = |reason| DefinitionsError::InvalidPath {
        path: path.to_string(),
        reason,
    };
    let trimmed = path.trim_matches(PATH_DELIMITER);
    if trimmed.is_empty() {
        return Err(invalid("the path is empty"));
    }
    let segments: Vec<&str> = trimmed.split(PATH_DELIMITER).collect();
    if segments.iter().any(|s| s.is_empty()) {
        return Err(invalid("empty path segment"));
    }
    Ok(segments)
}

/// Assembles the root directory from declarative entries.
pub fn build_root(
    directories: &[DirectorySpec],
    commands: &[CommandSpec],
) -> Result<DirectoryDef, DefinitionsError> {
    let mut root = DirectoryNode::default();
    for spec in directories {
        let segments = split_path(&spec.path)?;
        root.descend(&segments).description = spec.description.clone();
    }
    for spec in commands {
        let segments = split_path(&spec.path)?;
        let Some((name, parents)) = segments.split_last() else {
            return Err(DefinitionsError::InvalidPath {
                path: spec.path.clone(),
                reason: "the path is empty",
            });
        };
        let command = build_command(name, spec)?;
        root.descend(parents).commands.push(command);
    }
    log::debug!(
        "Assembled {} declarative command(s) in {} declared directorie(s).",
        commands.len(),
        directories.len()
    );
    root.into_def(DirectoryDef::root())
}

// --- COMMANDS & PARAMETERS ---

fn build_command(name: &str, spec: &CommandSpec) -> Result<CommandDef, DefinitionsError> {
    let mut builder = CommandDef::builder(Identifier::new(name, spec.description.as_str())?);
    for param in &spec.params {
        builder = builder.param(build_param(&spec.path, param)?)?;
    }

    let template = spec.output.clone().unwrap_or_default();
    let names: Vec<String> = spec.params.iter().map(|p| p.name.clone()).collect();
    Ok(builder.build(move |ctx, args| {
        let mut values = HashMap::with_capacity(names.len());
        for name in &names {
            let value: ParamValue = args.pop()?;
            values.insert(name.as_str(), value.to_string());
        }
        let text = render_template(&template, &values);
        if !text.is_empty() {
            ctx.println(&text);
        }
        Ok(())
    }))
}

/// Substitutes every `{name}` of `template` in a single pass. Placeholders without a
/// bound value are left untouched and substituted values are never rescanned.
fn render_template(template: &str, values: &HashMap<&str, String>) -> String {
    PLACEHOLDER_RE
        .replace_all(template, |caps: &Captures| {
            match caps.get(1).and_then(|name| values.get(name.as_str())) {
                Some(value) => value.clone(),
                None => caps.get(0).map_or_else(String::new, |m| m.as_str().to_string()),
            }
        })
        .into_owned()
}

fn build_param(command: &str, spec: &ParamSpec) -> Result<ParamDef, DefinitionsError> {
    let identifier = Identifier::new(spec.name.as_str(), spec.description.as_str())?;
    let mismatch = |expected: &'static str, found: &toml::Value| DefinitionsError::DefaultType {
        command: command.to_string(),
        param: spec.name.clone(),
        expected,
        found: found.to_string(),
    };
    if !spec.values.is_empty() && spec.kind != ParamType::String {
        log::warn!(
            "Ignoring 'values' of non-string parameter '{}' in '{command}'.",
            spec.name
        );
    }

    let def = match spec.kind {
        ParamType::Int => {
            let mut def = ValueParamDef::new(identifier);
            if let Some(value) = &spec.default {
                def = def.with_default_value(value.as_integer().ok_or_else(|| mismatch("int", value))?);
            }
            ParamDef::Int(def)
        }
        ParamType::Double => {
            let mut def = ValueParamDef::new(identifier);
            if let Some(value) = &spec.default {
                let number = value
                    .as_float()
                    .or_else(|| value.as_integer().map(|i| i as f64))
                    .ok_or_else(|| mismatch("double", value))?;
                def = def.with_default_value(number);
            }
            ParamDef::Double(def)
        }
        ParamType::Bool => {
            let mut def = ValueParamDef::new(identifier);
            if let Some(value) = &spec.default {
                def = def.with_default_value(value.as_bool().ok_or_else(|| mismatch("bool", value))?);
            }
            ParamDef::Bool(def)
        }
        ParamType::String => {
            let mut def = StringParamDef::new(identifier).with_static_values(spec.values.clone());
            if let Some(value) = &spec.default {
                def = def.with_default_value(value.as_str().ok_or_else(|| mismatch("string", value))?);
            }
            ParamDef::String(def)
        }
        ParamType::Directory | ParamType::Command => {
            let mut def = ValueParamDef::new(identifier);
            if let Some(value) = &spec.default {
                let path = value.as_str().ok_or_else(|| mismatch("path", value))?;
                def = def.with_default_value(path.to_string());
            }
            if spec.kind == ParamType::Directory {
                ParamDef::Directory(def)
            } else {
                ParamDef::Command(def)
            }
        }
    };
    Ok(def)
}

// MARK: --- UNIT TESTS ---
