//! Golden report rendering.
//!
//! Turns a query specification plus its live results and explain output into
//! a deterministic, sectioned markdown document, streamed line by line
//! through a write-once sink.

pub mod markdown;
pub mod render;
pub mod sink;

pub use markdown::MarkdownWriter;
pub use render::Reporter;
pub use sink::{BufferSink, IoSink, MarkdownSink};
