//! Command conformance runner.
//!
//! Replays a table of command test cases against running deployments,
//! injecting a diagnostic `comment` field into every command and checking
//! that outcomes are unchanged. Failpoint switches requested by a case are
//! always released before the next case, pass or fail.

pub mod case;
pub mod denylist;
pub mod errors;
pub mod runner;
pub mod topology;

pub use case::{CaseContext, Provided, SetupState, TestCase};
pub use denylist::Denylist;
pub use errors::{ConformanceError, Result};
pub use runner::{CaseFailure, COMMAND_NOT_SUPPORTED, ConformanceRunner, RunSummary};
pub use topology::{
    CommandExecutor, CommandOutcome, FailpointControl, FailpointGuard, Topology, TopologyContext,
    TopologyKind,
};
