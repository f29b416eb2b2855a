// src/cli/repl.rs

//! A line-based terminal front end for a [`Shell`]. Lines are read from stdin; a line
//! ending in a TAB character prints completion assistance instead of being executed.

use crate::core::assist::AssistReport;
use crate::core::completion::CompletionKind;
use crate::core::output::CliOutput;
use crate::core::shell::{Shell, ShellError};
use anyhow::Result;
use colored::Colorize;
use std::io::{self, BufRead, Write};

const ASSIST_TRIGGER: char = '\t';
const EXIT_COMMANDS: &[&str] = &["exit", "quit"];

/// Writes messages to stdout and errors, in red, to stderr.
#[derive(Debug, Default)]
pub struct TerminalOutput;

impl CliOutput for TerminalOutput {
    fn println(&mut self, message: &str) {
        println!("{message}");
    }

    fn eprintln(&mut self, message: &str) {
        eprintln!("{}", message.red());
    }
}

/// Reads and runs lines from stdin until EOF or `exit`.
pub fn run_repl(shell: &mut Shell, prompt: &str) -> Result<()> {
    println!("{}", t!("repl.welcome").bold());
    println!("{}", t!("repl.hint").dimmed());

    let stdin = io::stdin();
    let mut output = TerminalOutput;
    let mut line = String::new();
    loop {
        print!("{}", shell.prompt(prompt).cyan());
        io::stdout().flush()?;

        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            println!();
            break;
        }
        let entered = line.trim_end_matches(['\n', '\r']);

        if let Some(partial) = entered.strip_suffix(ASSIST_TRIGGER) {
            let report = shell.assist_report(partial, partial.chars().count());
            render_report(&report);
            continue;
        }
        if EXIT_COMMANDS.contains(&entered.trim()) {
            break;
        }
        if let Err(e) = shell.execute(entered, &mut output) {
            report_error(&e);
        }
    }

    println!("{}", t!("repl.goodbye").dimmed());
    Ok(())
}

/// Prints the candidates of an assist report, one colored group per kind.
pub fn render_report(report: &AssistReport) {
    if let Some(usage) = &report.usage {
        println!("{} {}", t!("assist.usage").dimmed(), usage);
    }
    if report.candidates.is_empty() {
        println!("{}", t!("assist.no_suggestions").dimmed());
    }
    for (kind, words) in &report.candidates {
        let rendered: Vec<String> = words
            .iter()
            .map(|word| {
                let full = format!("{}{word}", report.replace_prefix);
                match kind {
                    CompletionKind::Directory => format!("{full}/").blue().bold().to_string(),
                    CompletionKind::Command => full.green().to_string(),
                    CompletionKind::ParamName => full.yellow().to_string(),
                    CompletionKind::ParamValue => full,
                }
            })
            .collect();
        println!("  {}", rendered.join("  "));
    }
    if let Some(error) = &report.error {
        eprintln!("{}: {}", t!("error.label").red().bold(), error);
    }
}

/// Prints a session error with its cause chain.
pub fn report_error(error: &ShellError) {
    eprintln!("{}: {}", t!("error.label").red().bold(), error);
    if let ShellError::Execution { source, .. } = error {
        for cause in source.chain().skip(1) {
            eprintln!("  {} {}", t!("error.caused_by").dimmed(), cause);
        }
    }
}
