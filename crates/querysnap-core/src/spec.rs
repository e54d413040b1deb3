use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A query whose behavior gets captured as a golden artifact.
///
/// Specs are built by the caller and never mutated afterwards; the renderer
/// treats them as read-only input.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum QuerySpec {
    /// An aggregation pipeline: an ordered sequence of stage documents.
    Aggregation { pipeline: Vec<Value> },
    /// A distinct query: unique values of `key` across documents matching
    /// `filter`.
    Distinct {
        key: String,
        #[serde(default = "empty_filter")]
        filter: Value,
    },
}

fn empty_filter() -> Value {
    Value::Object(serde_json::Map::new())
}

impl QuerySpec {
    /// Build an aggregation spec from stage documents.
    pub fn aggregation(pipeline: Vec<Value>) -> Self {
        Self::Aggregation { pipeline }
    }

    /// Build a distinct spec; an empty filter matches every document.
    pub fn distinct(key: impl Into<String>, filter: Value) -> Self {
        Self::Distinct {
            key: key.into(),
            filter,
        }
    }
}
