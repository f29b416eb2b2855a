//! # jaci
//!
//! An embeddable command shell engine: a hierarchical namespace of directories and
//! commands, typed parameter binding and context-aware auto-completion. Embedders build a
//! [`models::DirectoryDef`] tree, compile it into a [`core::namespace::Namespace`] and
//! drive it through a [`core::shell::Shell`].

include!(concat!(env!("OUT_DIR"), "/translations.rs"));

pub mod cli;
pub mod constants;
pub mod core;
pub mod models;
pub mod system;
