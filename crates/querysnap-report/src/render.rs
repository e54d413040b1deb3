use querysnap_core::explain::{ExplainMode, ExplainSummarizer, VolatileFieldScrubber};
use querysnap_core::{Collection, QuerySpec, Result, canon};
use serde_json::Value;

use crate::markdown::MarkdownWriter;
use crate::sink::MarkdownSink;

/// Renders golden query records into a markdown document.
///
/// One reporter spans one rendering session: its section counter never
/// resets, so every query rendered through it gets the next number. Failures
/// from the collection or the summarizer abort the current render and
/// propagate unchanged; a partially written record is the caller's signal to
/// discard the artifact.
pub struct Reporter<S: MarkdownSink> {
    writer: MarkdownWriter<S>,
    summarizer: Box<dyn ExplainSummarizer>,
}

impl<S: MarkdownSink> Reporter<S> {
    /// Reporter with the reference volatile-field summarizer.
    pub fn new(sink: S) -> Self {
        Self::with_summarizer(sink, Box::new(VolatileFieldScrubber))
    }

    pub fn with_summarizer(sink: S, summarizer: Box<dyn ExplainSummarizer>) -> Self {
        Self {
            writer: MarkdownWriter::new(sink),
            summarizer,
        }
    }

    pub fn into_sink(self) -> S {
        self.writer.into_sink()
    }

    /// Numbered top-level header introducing the next query record.
    pub fn section(&mut self, title: &str) -> Result<()> {
        self.writer.section(title)
    }

    /// Render a query spec through the matching operation.
    pub fn render_spec(
        &mut self,
        coll: &dyn Collection,
        spec: &QuerySpec,
        sort_results: bool,
    ) -> Result<()> {
        match spec {
            QuerySpec::Aggregation { pipeline } => {
                self.render_aggregation(coll, pipeline, sort_results)
            }
            QuerySpec::Distinct { key, filter } => self.render_distinct(coll, key, filter),
        }
    }

    /// Render an aggregation: the pipeline, its results, and the summarized
    /// explain, in that order, followed by a separator line.
    ///
    /// With `sort_results` set (the default posture for golden files) the
    /// result documents are reordered deterministically; otherwise the engine
    /// order is kept verbatim.
    pub fn render_aggregation(
        &mut self,
        coll: &dyn Collection,
        pipeline: &[Value],
        sort_results: bool,
    ) -> Result<()> {
        tracing::debug!(
            event = "render_aggregation",
            collection = coll.name(),
            stages = pipeline.len()
        );
        let results = coll.aggregate(pipeline)?;
        let explain = coll.explain_aggregate(ExplainMode::AllPlansExecution, pipeline)?;
        let flat = self.summarizer.summarize(&explain)?;

        self.writer.subsection("Pipeline")?;
        self.writer
            .code_json(&canon::sorted_multiline(&Value::Array(pipeline.to_vec())))?;

        self.writer.subsection("Results")?;
        self.writer
            .code_json(&canon::normalize_result_array(&results, sort_results))?;

        self.writer.subsection("Summarized explain")?;
        self.writer.code_json(&canon::sorted_multiline(&flat.0))?;

        self.writer.linebreak()
    }

    /// Render a distinct query: the engine's answer next to an independently
    /// derived expected set, then the summarized explain.
    pub fn render_distinct(
        &mut self,
        coll: &dyn Collection,
        key: &str,
        filter: &Value,
    ) -> Result<()> {
        tracing::debug!(event = "render_distinct", collection = coll.name(), key = key);
        let values = coll.distinct(key, filter)?;
        let explain = coll.explain_distinct(ExplainMode::AllPlansExecution, key, filter)?;
        let flat = self.summarizer.summarize(&explain)?;
        let expected = expected_distinct(coll, key, filter)?;

        self.writer.subsection(&format!(
            "Distinct on \"{key}\", with filter: {}",
            canon::single_line(filter)
        ))?;

        self.writer.subsection("Expected results")?;
        self.writer.code_one_line(&Value::Array(expected))?;

        self.writer.subsection("Distinct results")?;
        self.writer.code_one_line(&Value::Array(values))?;

        self.writer.subsection("Summarized explain")?;
        self.writer.code_json(&canon::sorted_multiline(&flat.0))?;

        self.writer.linebreak()
    }
}

/// Recompute the distinct set without the engine's distinct path.
///
/// Scans the filter matches projected to `key`, collapses empty projections
/// to the canonical null marker, dedupes, and sorts ascending over the
/// canonical single-line form (so `1` orders before `null`). Kept separate
/// from [`Collection::distinct`] on purpose: a defect in the engine's
/// distinct implementation must not silently agree with itself.
fn expected_distinct(coll: &dyn Collection, key: &str, filter: &Value) -> Result<Vec<Value>> {
    let mut unique = std::collections::BTreeMap::new();
    for doc in coll.find_projected(filter, key)? {
        let value = canon::canonical_value(doc.get(key));
        unique.entry(canon::single_line(&value)).or_insert(value);
    }
    Ok(unique.into_values().collect())
}
