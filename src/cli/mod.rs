// src/cli/mod.rs

//! Command-line arguments of the `jaci` binary and its terminal front end.

use clap::Parser;

pub mod repl;

/// Builds the dynamic, color-aware full help string at runtime.
fn build_help_string() -> &'static str {
    let use_colors = colored::control::SHOULD_COLORIZE.should_colorize();

    let template = t!("cli.help.template");

    let title = if use_colors { "\x1b[1;33m" } else { "" }; // Bold Yellow
    let hl = if use_colors { "\x1b[1;36m" } else { "" }; // Bold Cyan
    let cmd = if use_colors { "\x1b[36m" } else { "" }; // Cyan
    let dim = if use_colors { "\x1b[2m" } else { "" };
    let reset = if use_colors { "\x1b[0m" } else { "" };

    let formatted_string = template
        .replace("<title>", title)
        .replace("</title>", reset)
        .replace("<hl>", hl)
        .replace("</hl>", reset)
        .replace("<cmd>", cmd)
        .replace("</cmd>", reset)
        .replace("<dim>", dim)
        .replace("</dim>", reset);

    Box::leak(formatted_string.into_boxed_str())
}

/// jaci: an embeddable command shell with hierarchical commands and auto-completion.
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about,
    help_template = { build_help_string() },
    styles = clap::builder::Styles::styled()
        .header(clap::builder::styling::AnsiColor::Yellow.on_default().bold())
        .usage(clap::builder::styling::AnsiColor::Yellow.on_default().bold())
        .literal(clap::builder::styling::AnsiColor::Cyan.on_default().bold())
        .placeholder(clap::builder::styling::AnsiColor::Green.on_default()),
)]
pub struct Cli {
    /// Path to a `jaci.toml` file (`~` and `$VARS` are expanded).
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<String>,

    /// Executes a command line and exits. May be repeated.
    #[arg(short = 'e', long = "exec", value_name = "LINE")]
    pub exec: Vec<String>,

    /// Prints completion assistance for a line and exits.
    #[arg(long, value_name = "LINE", conflicts_with = "exec")]
    pub complete: Option<String>,

    /// Prints the completion report as JSON.
    #[arg(long, requires = "complete")]
    pub json: bool,
}

// MARK: --- UNIT TESTS ---

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exec_is_repeatable() {
        let cli = Cli::try_parse_from(["jaci", "-e", "pwd", "--exec", "ls net"]).unwrap();
        assert_eq!(cli.exec, vec!["pwd", "ls net"]);
        assert!(cli.complete.is_none());
    }

    #[test]
    fn test_json_requires_complete() {
        assert!(Cli::try_parse_from(["jaci", "--json"]).is_err());
        let cli = Cli::try_parse_from(["jaci", "--complete", "net/", "--json"]).unwrap();
        assert!(cli.json);
        assert_eq!(cli.complete.as_deref(), Some("net/"));
    }
}
