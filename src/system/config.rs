// src/system/config.rs

//! Locating, reading and compiling `jaci.toml`.

use crate::constants::{CONFIG_DIR_NAME, CONFIG_FILENAME, DEFAULT_PROMPT};
use crate::core::builtins::builtin_commands;
use crate::core::namespace::{Namespace, NamespaceError};
use crate::core::parameters::ParamResolver;
use crate::models::DefinitionError;
use crate::system::definitions::{self, CommandSpec, DefinitionsError, DirectorySpec};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

const DEMO_CONFIG: &str = include_str!("../../assets/demo.toml");

/// Errors that can occur while loading the configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// `~` or a `$VAR` in the config path could not be expanded.
    #[error("Could not expand config path '{path}': {reason}")]
    PathExpansion {
        /// The path as given.
        path: String,
        /// The expansion error.
        reason: String,
    },
    /// The config file could not be read.
    #[error("Could not read '{path}': {source}")]
    Io {
        /// The file that failed.
        path: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The content is not a valid `jaci.toml` document.
    #[error("Failed to parse '{origin}': {source}")]
    TomlParse {
        /// A path, or `<demo>` for the bundled file.
        origin: String,
        /// The underlying parsing error from the `toml` crate.
        #[source]
        source: toml::de::Error,
    },
    /// `[[directories]]` or `[[commands]]` entries are invalid.
    #[error("Invalid command definitions: {0}")]
    Definitions(#[from] DefinitionsError),
    /// The built-in commands failed to define themselves.
    #[error("Invalid built-in commands: {0}")]
    Builtins(#[from] DefinitionError),
    /// The definitions did not compile into a namespace.
    #[error("Could not build the command namespace: {0}")]
    Namespace(#[from] NamespaceError),
}

/// The `jaci.toml` document.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ShellConfig {
    /// Prompt template; `{path}` is replaced by the working directory.
    pub prompt: String,
    /// Accept `yes/no`, `on/off` and `1/0` for boolean parameters.
    pub bool_aliases: bool,
    /// Register `cd`, `ls`, `pwd` and `man` as global commands.
    pub builtins: bool,
    /// `[[directories]]` entries.
    pub directories: Vec<DirectorySpec>,
    /// `[[commands]]` entries.
    pub commands: Vec<CommandSpec>,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            prompt: DEFAULT_PROMPT.to_string(),
            bool_aliases: false,
            builtins: true,
            directories: Vec::new(),
            commands: Vec::new(),
        }
    }
}

impl ShellConfig {
    /// The bundled demo definitions.
    pub fn demo() -> Result<Self, ConfigError> {
        parse(DEMO_CONFIG, "<demo>")
    }

    /// Compiles the declared directories and commands (plus built-ins) into a namespace.
    pub fn build_namespace(&self) -> Result<Namespace, ConfigError> {
        let root = definitions::build_root(&self.directories, &self.commands)?;
        let mut builder = Namespace::builder(root)
            .resolver(ParamResolver::new().with_bool_aliases(self.bool_aliases));
        if self.builtins {
            builder = builder.global_commands(builtin_commands()?);
        }
        Ok(builder.build()?)
    }
}

/// Where a loaded configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// A `jaci.toml` on disk.
    File(PathBuf),
    /// The bundled demo definitions.
    Demo,
}

/// A parsed configuration and its origin.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// The parsed document.
    pub config: ShellConfig,
    /// Where it came from.
    pub source: ConfigSource,
}

/// `<config_dir>/jaci/jaci.toml`, if the platform has a config directory.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILENAME))
}

/// Expands `~` and environment variables in a user-supplied path.
pub fn expand_path(raw: &str) -> Result<PathBuf, ConfigError> {
    shellexpand::full(raw)
        .map(|expanded| PathBuf::from(expanded.as_ref()))
        .map_err(|e| ConfigError::PathExpansion {
            path: raw.to_string(),
            reason: e.to_string(),
        })
}

/// Parses a `jaci.toml` document. `origin` names it in errors.
pub fn parse(content: &str, origin: &str) -> Result<ShellConfig, ConfigError> {
    toml::from_str(content).map_err(|source| ConfigError::TomlParse {
        origin: origin.to_string(),
        source,
    })
}

/// Reads and parses the file at `path`.
pub fn load_from(path: &Path) -> Result<ShellConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse(&content, &path.display().to_string())
}

/// Loads the configuration from `explicit`, else from the default location, else falls
/// back to the demo definitions. Only an explicit path is required to exist.
pub fn load(explicit: Option<&str>) -> Result<LoadedConfig, ConfigError> {
    if let Some(raw) = explicit {
        let path = expand_path(raw)?;
        log::debug!("Loading config from '{}'", path.display());
        return Ok(LoadedConfig {
            config: load_from(&path)?,
            source: ConfigSource::File(path),
        });
    }

    match default_config_path() {
        Some(path) if path.is_file() => {
            log::debug!("Loading config from default location '{}'", path.display());
            Ok(LoadedConfig {
                config: load_from(&path)?,
                source: ConfigSource::File(path),
            })
        }
        _ => {
            log::debug!("No config file found, using the demo definitions.");
            Ok(LoadedConfig {
                config: ShellConfig::demo()?,
                source: ConfigSource::Demo,
            })
        }
    }
}

// MARK: --- UNIT TESTS ---

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_apply_to_missing_keys() {
        let config = parse("bool_aliases = true", "inline").unwrap();
        assert!(config.bool_aliases);
        assert!(config.builtins);
        assert_eq!(config.prompt, DEFAULT_PROMPT);
        assert!(config.commands.is_empty());
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        assert!(matches!(
            parse("colour = 'red'", "inline"),
            Err(ConfigError::TomlParse { .. })
        ));
    }

    #[test]
    fn test_demo_config_builds() {
        let config = ShellConfig::demo().unwrap();
        let namespace = config.build_namespace().unwrap();
        assert!(namespace.find_command(namespace.root(), "net/ping").is_ok());
        assert!(namespace.find_command(namespace.root(), "cd").is_ok());
    }

    #[test]
    fn test_load_from_explicit_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
prompt = "demo {{path}}$ "
builtins = false

[[commands]]
path = "tools/greet"
output = "hello {{name}}"

[[commands.params]]
name = "name"
default = "world"
"#
        )
        .unwrap();

        let loaded = load(file.path().to_str()).unwrap();
        assert_eq!(loaded.source, ConfigSource::File(file.path().to_path_buf()));
        assert_eq!(loaded.config.prompt, "demo {path}$ ");

        let namespace = loaded.config.build_namespace().unwrap();
        assert!(namespace.find_command(namespace.root(), "tools/greet").is_ok());
        assert!(namespace.find_command(namespace.root(), "cd").is_err());
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml");
        assert!(matches!(
            load(missing.to_str()),
            Err(ConfigError::Io { .. })
        ));
    }
}
