use serde_json::Value;

use crate::errors::Result;

/// Raw outcome of one command execution.
#[derive(Debug, Clone)]
pub struct CommandOutcome {
    /// Whether the server reported success (`ok: 1`).
    pub ok: bool,
    /// Server error code on failure.
    pub code: Option<i64>,
    /// Full result payload, kept verbatim for failure reports.
    pub raw: Value,
}

impl CommandOutcome {
    pub fn success(raw: Value) -> Self {
        Self {
            ok: true,
            code: None,
            raw,
        }
    }

    pub fn failure(code: i64, raw: Value) -> Self {
        Self {
            ok: false,
            code: Some(code),
            raw,
        }
    }
}

/// Collaborator that executes a command document against a database.
pub trait CommandExecutor {
    fn run_command(&self, db: &str, command: &Value) -> Result<CommandOutcome>;
}

/// Collaborator that toggles a named failpoint on one node.
pub trait FailpointControl {
    /// Node identity, for logging and failure reports.
    fn node(&self) -> &str;

    /// Enable the failpoint; the returned guard disables it.
    fn enable(&self, subsystem: &str) -> Result<FailpointGuard>;
}

/// Armed failpoint switch.
///
/// The switch is released exactly once: either explicitly through
/// [`FailpointGuard::disable`], or on drop when the case aborted before the
/// runner could get there. A drop-path release failure is logged, not
/// propagated; the run must move on to the next case.
pub struct FailpointGuard {
    node: String,
    subsystem: String,
    release: Option<Box<dyn FnOnce() -> Result<()> + Send>>,
}

impl FailpointGuard {
    pub fn new(
        node: impl Into<String>,
        subsystem: impl Into<String>,
        release: Box<dyn FnOnce() -> Result<()> + Send>,
    ) -> Self {
        Self {
            node: node.into(),
            subsystem: subsystem.into(),
            release: Some(release),
        }
    }

    /// Disable the failpoint now, surfacing any control-plane error.
    pub fn disable(mut self) -> Result<()> {
        match self.release.take() {
            Some(release) => release(),
            None => Ok(()),
        }
    }
}

impl Drop for FailpointGuard {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            if let Err(err) = release() {
                tracing::warn!(
                    event = "failpoint_release_failed",
                    node = %self.node,
                    subsystem = %self.subsystem,
                    error = %err
                );
            }
        }
    }
}

impl std::fmt::Debug for FailpointGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FailpointGuard")
            .field("node", &self.node)
            .field("subsystem", &self.subsystem)
            .field("armed", &self.release.is_some())
            .finish()
    }
}

/// Shape of the deployment a suite runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopologyKind {
    Standalone,
    Sharded,
}

/// Topology metadata carried into each case's resolution context.
#[derive(Debug, Clone, Default)]
pub struct TopologyContext {
    /// Identity of the first data-owning shard, when the topology has one.
    pub first_shard_name: Option<String>,
}

/// A running deployment, as seen by the runner.
///
/// Lifecycle (start, stop, restarts) stays with the caller; the runner only
/// issues commands and toggles failpoints through these handles.
pub trait Topology {
    fn kind(&self) -> TopologyKind;

    /// Command entry point: the router on a sharded topology, the node
    /// itself on a standalone one.
    fn executor(&self) -> &dyn CommandExecutor;

    /// Failpoint control on the execution tier (the data-owning node).
    fn execution_failpoints(&self) -> &dyn FailpointControl;

    /// Failpoint control on the routing tier, when one exists.
    fn routing_failpoints(&self) -> Option<&dyn FailpointControl>;

    fn context(&self) -> TopologyContext;
}
