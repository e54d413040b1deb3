use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::canon::{compare_values, single_line};
use crate::error::Result;

/// Explain verbosity requested from the engine.
///
/// Only the all-plans mode is used by the golden harness: it is the one that
/// exposes rejected plan candidates, which is exactly the nondeterminism the
/// summarizer has to flatten.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExplainMode {
    AllPlansExecution,
}

impl ExplainMode {
    /// Wire name of the mode, as sent to the engine.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AllPlansExecution => "allPlansExecution",
        }
    }
}

/// Raw explain output as produced by the engine. Opaque to the harness.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExplainPlan(pub Value);

/// Order-stable projection of an [`ExplainPlan`], ready for rendering as
/// sorted multi-line text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FlatPlanSummary(pub Value);

/// Collaborator that reduces a raw explain plan to its stable summary.
pub trait ExplainSummarizer {
    fn summarize(&self, plan: &ExplainPlan) -> Result<FlatPlanSummary>;
}

/// Reference summarizer: strips fields that vary between runs and sorts the
/// plan-candidate arrays by canonical form.
///
/// The scrub list covers execution statistics, host identity, and timestamps;
/// structural fields (stage names, index bounds, filters) pass through
/// untouched.
#[derive(Debug, Clone, Default)]
pub struct VolatileFieldScrubber;

const VOLATILE_FIELDS: &[&str] = &[
    "executionTimeMillis",
    "executionTimeMillisEstimate",
    "works",
    "advanced",
    "needTime",
    "needYield",
    "restoreState",
    "saveState",
    "isEOF",
    "host",
    "port",
    "serverInfo",
    "serverParameters",
    "operationTime",
    "clusterTime",
    "$clusterTime",
    "ok",
];

const CANDIDATE_ARRAYS: &[&str] = &["allPlansExecution", "rejectedPlans", "shards"];

impl ExplainSummarizer for VolatileFieldScrubber {
    fn summarize(&self, plan: &ExplainPlan) -> Result<FlatPlanSummary> {
        Ok(FlatPlanSummary(scrub(&plan.0)))
    }
}

fn scrub(value: &Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(items.iter().map(scrub).collect()),
        Value::Object(map) => {
            let mut out = serde_json::Map::new();
            for (key, val) in map {
                if VOLATILE_FIELDS.contains(&key.as_str()) {
                    continue;
                }
                let mut scrubbed = scrub(val);
                if CANDIDATE_ARRAYS.contains(&key.as_str()) {
                    if let Value::Array(items) = &mut scrubbed {
                        items.sort_by(|a, b| {
                            compare_values(a, b).then_with(|| single_line(a).cmp(&single_line(b)))
                        });
                    }
                }
                out.insert(key.clone(), scrubbed);
            }
            Value::Object(out)
        }
        other => other.clone(),
    }
}
