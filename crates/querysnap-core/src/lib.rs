//! Core contracts and helpers for Querysnap.
//!
//! This crate defines the query specification types, canonical serialization
//! used for diff-stable output, and the collaborator traits through which the
//! renderer and conformance runner talk to a query engine.

pub mod canon;
pub mod capture;
pub mod collection;
pub mod error;
pub mod explain;
pub mod spec;

pub use canon::{
    canonical_value, compare_values, normalize_result_array, single_line, sorted_multiline,
};
pub use capture::{CaptureCollection, CaptureSet, QueryCapture};
pub use collection::Collection;
pub use error::{Error, Result};
pub use explain::{ExplainMode, ExplainPlan, ExplainSummarizer, FlatPlanSummary, VolatileFieldScrubber};
pub use spec::QuerySpec;

/// Current contract version for capture artifacts.
pub const CAPTURE_VERSION: &str = "0.1";
