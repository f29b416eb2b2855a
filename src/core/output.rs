// src/core/output.rs

//! The text sink commands write to.

/// Where executors write human-readable messages. The engine only forwards text;
/// formatting and coloring are up to the implementation.
pub trait CliOutput {
    /// Writes a regular message line.
    fn println(&mut self, message: &str);

    /// Writes an error line.
    fn eprintln(&mut self, message: &str);
}

/// One line written to a [`BufferedOutput`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputLine {
    /// Written with [`CliOutput::println`].
    Message(String),
    /// Written with [`CliOutput::eprintln`].
    Error(String),
}

/// Collects output in memory. Useful for tests and for embedders that render later.
#[derive(Debug, Default, Clone)]
pub struct BufferedOutput {
    lines: Vec<OutputLine>,
}

impl BufferedOutput {
    /// An empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every line in the order it was written.
    pub fn lines(&self) -> &[OutputLine] {
        &self.lines
    }

    /// The regular messages, errors excluded.
    pub fn messages(&self) -> Vec<&str> {
        self.lines
            .iter()
            .filter_map(|line| match line {
                OutputLine::Message(message) => Some(message.as_str()),
                OutputLine::Error(_) => None,
            })
            .collect()
    }

    /// The error lines only.
    pub fn errors(&self) -> Vec<&str> {
        self.lines
            .iter()
            .filter_map(|line| match line {
                OutputLine::Error(message) => Some(message.as_str()),
                OutputLine::Message(_) => None,
            })
            .collect()
    }

    /// Drops everything written so far.
    pub fn clear(&mut self) {
        self.lines.clear();
    }
}

impl CliOutput for BufferedOutput {
    fn println(&mut self, message: &str) {
        self.lines.push(OutputLine::Message(message.to_string()));
    }

    fn eprintln(&mut self, message: &str) {
        self.lines.push(OutputLine::Error(message.to_string()));
    }
}
