// src/constants.rs

//! Delimiters, limits and file names shared across the crate.

/// Separates directory and command names in a path (`/net/tools/ping`).
pub const PATH_DELIMITER: char = '/';

/// Separates a parameter name from its value in a named argument (`count=3`).
pub const PARAM_VALUE_DELIMITER: char = '=';

/// Separates tokens on a command line.
pub const TOKEN_SEPARATOR: char = ' ';

/// How many quote levels the tokenizer tracks (`'outer "inner" outer'`).
pub const MAX_QUOTE_DEPTH: usize = 2;

/// Path segment referring to the directory itself.
pub const CURRENT_DIRECTORY: &str = ".";

/// Path segment referring to the parent directory.
pub const PARENT_DIRECTORY: &str = "..";

/// The name of the directory containing jaci configuration (in the system config dir).
pub const CONFIG_DIR_NAME: &str = "jaci";

/// The name of the main configuration file (inside the config directory).
pub const CONFIG_FILENAME: &str = "jaci.toml";

/// The prompt used when the configuration does not define one.
pub const DEFAULT_PROMPT: &str = "{path}> ";
