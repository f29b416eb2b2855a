//! # System Interaction Layer
//!
//! Everything that touches the outside world on behalf of the engine: reading the
//! `jaci.toml` configuration and turning its declarative command entries into definitions.
//!
//! ## Modules
//!
//! - **`config`**: Locates, loads and parses `jaci.toml`, falling back to the bundled demo
//!   definitions, and compiles it into a namespace.
//! - **`definitions`**: Builds a directory tree from `[[directories]]` and `[[commands]]`
//!   entries.

pub mod config;
pub mod definitions;
