// src/bin/jaci.rs

use anyhow::Result;
use clap::Parser;
use colored::*;
use jaci::{
    cli::{
        Cli,
        repl::{self, TerminalOutput},
    },
    core::shell::{NamespaceHandle, Shell, ShellError},
    system::config::{self, ConfigSource},
    t,
};

/// The main entry point of the `jaci` application.
/// It sets up logging, parses arguments, runs the requested mode,
/// and performs centralized error handling.
fn main() {
    env_logger::init();

    if let Err(e) = run_cli(Cli::parse()) {
        // Command lines passed with `--exec` fail with a distinct exit code.
        let code = if e.downcast_ref::<ShellError>().is_some() { 2 } else { 1 };
        eprintln!("\n{}: {}", t!("error.label").red().bold(), e);
        std::process::exit(code);
    }
}

fn run_cli(cli: Cli) -> Result<()> {
    log::debug!("CLI args parsed: {:?}", cli);

    let loaded = config::load(cli.config.as_deref())?;
    if loaded.source == ConfigSource::Demo {
        eprintln!("{}", t!("config.using_demo").dimmed());
    }
    let namespace = loaded.config.build_namespace()?;
    let mut shell = Shell::new(NamespaceHandle::new(namespace));

    if let Some(line) = &cli.complete {
        let report = shell.assist_report(line, line.chars().count());
        if cli.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            repl::render_report(&report);
        }
        return Ok(());
    }

    if !cli.exec.is_empty() {
        let mut output = TerminalOutput;
        for line in &cli.exec {
            shell.execute(line, &mut output)?;
        }
        return Ok(());
    }

    repl::run_repl(&mut shell, &loaded.config.prompt)
}
