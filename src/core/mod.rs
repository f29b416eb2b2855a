// src/core/mod.rs

//! # Engine Core
//!
//! The resolution and assistance engine. Nothing here touches the filesystem or the
//! terminal.
//!
//! ## Modules
//!
//! - **`trie`**: Case-insensitive prefix tree behind every lookup and completion.
//! - **`tokenizer`**: Splits a raw line into tokens, honouring quotes.
//! - **`parameters`**: Turns parameter definitions into parsers and completers.
//! - **`namespace`**: The immutable directory and command tree, with path walking.
//! - **`command_line`**: Binds tokens to a command's parameters.
//! - **`assist`**: Completion and parse-state feedback for a partial line.
//! - **`shell`**: A session with a working directory over a swappable namespace.
//! - **`builtins`**: The global `cd`, `ls`, `pwd` and `man` commands.

pub mod args;
pub mod assist;
pub mod builtins;
pub mod command_line;
pub mod completion;
pub mod errors;
pub mod execution;
pub mod namespace;
pub mod output;
pub mod parameters;
pub mod shell;
pub mod tokenizer;
pub mod trie;

#[cfg(test)]
pub(crate) mod test_support;
