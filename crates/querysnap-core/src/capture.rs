//! Recorded query executions.
//!
//! A capture is everything the renderer would otherwise fetch live: the
//! result set, the raw explain output, and (for distinct queries) the filter
//! scan backing the independent expected-set derivation. Captures let the
//! golden pipeline run and re-run without a database, which is also how the
//! renderer's own test suite feeds it fixed inputs.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::CAPTURE_VERSION;
use crate::collection::Collection;
use crate::error::{Error, Result};
use crate::explain::{ExplainMode, ExplainPlan};
use crate::spec::QuerySpec;

/// One recorded query execution.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum QueryCapture {
    Aggregation {
        pipeline: Vec<Value>,
        results: Vec<Value>,
        explain: Value,
    },
    Distinct {
        key: String,
        filter: Value,
        /// Values the engine's own distinct returned.
        values: Vec<Value>,
        /// Raw documents matching `filter`, for the independent scan.
        matching_docs: Vec<Value>,
        explain: Value,
    },
}

impl QueryCapture {
    /// The query this capture records, as a standalone spec.
    pub fn spec(&self) -> QuerySpec {
        match self {
            Self::Aggregation { pipeline, .. } => QuerySpec::Aggregation {
                pipeline: pipeline.clone(),
            },
            Self::Distinct { key, filter, .. } => QuerySpec::Distinct {
                key: key.clone(),
                filter: filter.clone(),
            },
        }
    }
}

/// Versioned set of captures for one collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureSet {
    pub capture_version: String,
    pub collection: String,
    pub captures: Vec<QueryCapture>,
}

impl CaptureSet {
    pub fn new(collection: impl Into<String>, captures: Vec<QueryCapture>) -> Self {
        Self {
            capture_version: CAPTURE_VERSION.to_string(),
            collection: collection.into(),
            captures,
        }
    }

    /// Parse a capture set, rejecting unknown contract versions.
    pub fn from_json(text: &str) -> Result<Self> {
        let set: Self = serde_json::from_str(text)?;
        if set.capture_version != CAPTURE_VERSION {
            return Err(Error::InvalidCapture(format!(
                "unsupported capture_version '{}', expected '{}'",
                set.capture_version, CAPTURE_VERSION
            )));
        }
        Ok(set)
    }
}

/// [`Collection`] implementation that replays a [`CaptureSet`].
///
/// Every call is answered from the recorded captures; a request with no
/// matching capture is an [`Error::InvalidCapture`], surfaced unchanged to
/// the renderer.
#[derive(Debug, Clone)]
pub struct CaptureCollection {
    set: CaptureSet,
}

impl CaptureCollection {
    pub fn new(set: CaptureSet) -> Self {
        Self { set }
    }

    pub fn captures(&self) -> &[QueryCapture] {
        &self.set.captures
    }

    fn aggregation(&self, pipeline: &[Value]) -> Result<(&[Value], &Value)> {
        self.set
            .captures
            .iter()
            .find_map(|capture| match capture {
                QueryCapture::Aggregation {
                    pipeline: recorded,
                    results,
                    explain,
                } if recorded == pipeline => Some((results.as_slice(), explain)),
                _ => None,
            })
            .ok_or_else(|| {
                Error::InvalidCapture(format!(
                    "no aggregation capture for pipeline {}",
                    crate::canon::single_line(&Value::Array(pipeline.to_vec()))
                ))
            })
    }

    fn distinct_capture(
        &self,
        key: &str,
        filter: &Value,
    ) -> Result<(&[Value], &[Value], &Value)> {
        self.set
            .captures
            .iter()
            .find_map(|capture| match capture {
                QueryCapture::Distinct {
                    key: recorded_key,
                    filter: recorded_filter,
                    values,
                    matching_docs,
                    explain,
                } if recorded_key == key && recorded_filter == filter => {
                    Some((values.as_slice(), matching_docs.as_slice(), explain))
                }
                _ => None,
            })
            .ok_or_else(|| {
                Error::InvalidCapture(format!(
                    "no distinct capture for key '{key}' with filter {}",
                    crate::canon::single_line(filter)
                ))
            })
    }
}

impl Collection for CaptureCollection {
    fn name(&self) -> &str {
        &self.set.collection
    }

    fn aggregate(&self, pipeline: &[Value]) -> Result<Vec<Value>> {
        self.aggregation(pipeline).map(|(results, _)| results.to_vec())
    }

    fn distinct(&self, key: &str, filter: &Value) -> Result<Vec<Value>> {
        self.distinct_capture(key, filter)
            .map(|(values, _, _)| values.to_vec())
    }

    fn find_projected(&self, filter: &Value, key: &str) -> Result<Vec<Value>> {
        let (_, docs, _) = self.distinct_capture(key, filter)?;
        Ok(docs.iter().map(|doc| project(doc, key)).collect())
    }

    fn explain_aggregate(&self, _mode: ExplainMode, pipeline: &[Value]) -> Result<ExplainPlan> {
        self.aggregation(pipeline)
            .map(|(_, explain)| ExplainPlan(explain.clone()))
    }

    fn explain_distinct(
        &self,
        _mode: ExplainMode,
        key: &str,
        filter: &Value,
    ) -> Result<ExplainPlan> {
        self.distinct_capture(key, filter)
            .map(|(_, _, explain)| ExplainPlan(explain.clone()))
    }
}

/// Projection with `{key: 1, _id: 0}` semantics: keep only `key`, and only
/// when the document actually carries it.
fn project(doc: &Value, key: &str) -> Value {
    let mut out = serde_json::Map::new();
    if let Value::Object(map) = doc {
        if let Some(value) = map.get(key) {
            out.insert(key.to_string(), value.clone());
        }
    }
    Value::Object(out)
}
