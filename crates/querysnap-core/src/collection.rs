use serde_json::Value;

use crate::error::Result;
use crate::explain::{ExplainMode, ExplainPlan};

/// Narrow seam to the query engine.
///
/// The harness only ever needs these six calls; everything else about the
/// engine (connection handling, retries, wire protocol) stays on the other
/// side of this trait. All calls are synchronous and block until the engine
/// answers, matching the step-by-step rendering contract.
pub trait Collection {
    /// Collection name, used in log events only, never in rendered output.
    fn name(&self) -> &str;

    /// Execute an aggregation pipeline and return its documents in engine
    /// order.
    fn aggregate(&self, pipeline: &[Value]) -> Result<Vec<Value>>;

    /// Return the engine's distinct values for `key` under `filter`.
    fn distinct(&self, key: &str, filter: &Value) -> Result<Vec<Value>>;

    /// Scan documents matching `filter`, projected to `key` only (no id
    /// field). Feeds the renderer's independent expected-set derivation.
    fn find_projected(&self, filter: &Value, key: &str) -> Result<Vec<Value>>;

    /// Explain the aggregation under the given mode.
    fn explain_aggregate(&self, mode: ExplainMode, pipeline: &[Value]) -> Result<ExplainPlan>;

    /// Explain the distinct query under the given mode.
    fn explain_distinct(&self, mode: ExplainMode, key: &str, filter: &Value)
    -> Result<ExplainPlan>;
}
