use std::io::Write;

use querysnap_core::Result;

/// Append-only destination for rendered markdown.
///
/// Lines are written once, in order, and never re-read or rewritten by the
/// renderer; retention is entirely the sink's concern.
pub trait MarkdownSink {
    fn write_line(&mut self, line: &str) -> Result<()>;
}

/// Sink writing each line to an [`std::io::Write`] target.
#[derive(Debug)]
pub struct IoSink<W: Write> {
    writer: W,
}

impl<W: Write> IoSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> MarkdownSink for IoSink<W> {
    fn write_line(&mut self, line: &str) -> Result<()> {
        self.writer.write_all(line.as_bytes())?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }
}

/// In-memory sink, used by tests and by the golden verify flow.
#[derive(Debug, Default)]
pub struct BufferSink {
    lines: Vec<String>,
}

impl BufferSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Full document text, one trailing newline per line.
    pub fn contents(&self) -> String {
        let mut text = String::new();
        for line in &self.lines {
            text.push_str(line);
            text.push('\n');
        }
        text
    }
}

impl MarkdownSink for BufferSink {
    fn write_line(&mut self, line: &str) -> Result<()> {
        self.lines.push(line.to_string());
        Ok(())
    }
}
