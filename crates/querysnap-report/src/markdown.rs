use querysnap_core::{Result, canon};
use serde_json::Value;

use crate::sink::MarkdownSink;

/// Markdown emission primitives over a sink.
///
/// Every primitive is a pure function of its structured input; the only state
/// is the top-level section counter, which starts at 1 and only ever
/// increments for the lifetime of the writer. One writer spans one rendering
/// session, so section numbers stay strictly increasing across every query
/// rendered into the same document.
pub struct MarkdownWriter<S: MarkdownSink> {
    sink: S,
    section_count: u64,
}

impl<S: MarkdownSink> MarkdownWriter<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            section_count: 1,
        }
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Numbered top-level section header: `## N. msg`.
    pub fn section(&mut self, msg: &str) -> Result<()> {
        let line = format!("## {}. {msg}", self.section_count);
        self.section_count += 1;
        self.sink.write_line(&line)
    }

    /// Unnumbered subsection header: `### msg`.
    pub fn subsection(&mut self, msg: &str) -> Result<()> {
        self.sink.write_line(&format!("### {msg}"))
    }

    /// Plain text line.
    pub fn line(&mut self, msg: &str) -> Result<()> {
        self.sink.write_line(msg)
    }

    /// Single-line canonical value wrapped in backticks.
    pub fn code_one_line(&mut self, value: &Value) -> Result<()> {
        self.sink
            .write_line(&format!("`{}`", canon::single_line(value)))
    }

    /// Fenced code block tagged with a format label.
    pub fn code(&mut self, text: &str, fmt: &str) -> Result<()> {
        self.sink.write_line(&format!("```{fmt}"))?;
        for line in text.lines() {
            self.sink.write_line(line)?;
        }
        self.sink.write_line("```")
    }

    /// Fenced code block with the default `json` label.
    pub fn code_json(&mut self, text: &str) -> Result<()> {
        self.code(text, "json")
    }

    /// Empty line, used as a section separator.
    pub fn linebreak(&mut self) -> Result<()> {
        self.sink.write_line("")
    }
}
