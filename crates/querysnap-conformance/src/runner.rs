use serde_json::{Value, json};

use crate::case::{CaseContext, SetupState, TestCase};
use crate::denylist::Denylist;
use crate::errors::{ConformanceError, Result};
use crate::topology::{FailpointGuard, Topology, TopologyKind};

/// Server code for a command the deployment does not support; counted as an
/// acceptable outcome alongside success and declared expected failures.
pub const COMMAND_NOT_SUPPORTED: i64 = 115;

/// One case whose outcome check failed, with the full result payload.
#[derive(Debug, Clone)]
pub struct CaseFailure {
    pub name: String,
    pub reason: String,
    pub payload: Value,
}

/// Outcome of replaying one suite against one topology.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub kind: TopologyKind,
    pub passed: Vec<String>,
    pub skipped: Vec<String>,
    pub failures: Vec<CaseFailure>,
}

impl RunSummary {
    fn new(kind: TopologyKind) -> Self {
        Self {
            kind,
            passed: Vec::new(),
            skipped: Vec::new(),
            failures: Vec::new(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.failures.is_empty()
    }
}

enum CaseVerdict {
    Pass,
    Fail { reason: String, payload: Value },
}

/// Replays command test cases with a diagnostic `comment` field injected,
/// checking that the augmented commands still behave as declared.
///
/// Deployment and failpoint collaborator failures abort the run and surface
/// unchanged; outcome-check failures are recorded per case with their full
/// payload and the run continues. Failpoints enabled for a case are always
/// released before the next case, on every path.
#[derive(Debug)]
pub struct ConformanceRunner {
    denylist: Denylist,
}

impl ConformanceRunner {
    pub fn new(denylist: Denylist) -> Self {
        Self { denylist }
    }

    /// Replay the full table once against each supplied topology, in order.
    /// The canonical conformance pass is a standalone node followed by a
    /// routed sharded cluster.
    pub fn run_suites(
        &self,
        cases: &[TestCase],
        topologies: &[&dyn Topology],
    ) -> Result<Vec<RunSummary>> {
        topologies
            .iter()
            .map(|topology| self.run_suite(cases, *topology))
            .collect()
    }

    /// Replay the table once against one topology.
    pub fn run_suite(&self, cases: &[TestCase], topology: &dyn Topology) -> Result<RunSummary> {
        let mut summary = RunSummary::new(topology.kind());
        for case in cases {
            if self.denylist.contains(&case.name) {
                tracing::info!(event = "case_skipped", case = %case.name);
                summary.skipped.push(case.name.clone());
                continue;
            }
            tracing::info!(event = "case_started", case = %case.name);

            let mut guards: Vec<FailpointGuard> = Vec::new();
            if let Some(subsystem) = &case.failpoint {
                let execution = topology.execution_failpoints();
                tracing::debug!(
                    event = "failpoint_enabled",
                    case = %case.name,
                    node = execution.node(),
                    subsystem = %subsystem
                );
                guards.push(execution.enable(subsystem)?);
                // On a routed topology the switch must flip on both tiers.
                if let Some(routing) = topology.routing_failpoints() {
                    tracing::debug!(
                        event = "failpoint_enabled",
                        case = %case.name,
                        node = routing.node(),
                        subsystem = %subsystem
                    );
                    guards.push(routing.enable(subsystem)?);
                }
            }

            let verdict = self.run_case(case, topology);

            let mut release_err: Option<ConformanceError> = None;
            for guard in guards {
                if let Err(err) = guard.disable() {
                    release_err.get_or_insert(err);
                }
            }

            match verdict? {
                CaseVerdict::Pass => {
                    tracing::info!(event = "case_passed", case = %case.name);
                    summary.passed.push(case.name.clone());
                }
                CaseVerdict::Fail { reason, payload } => {
                    tracing::warn!(
                        event = "case_failed",
                        case = %case.name,
                        reason = %reason,
                        payload = %payload
                    );
                    summary.failures.push(CaseFailure {
                        name: case.name.clone(),
                        reason,
                        payload,
                    });
                }
            }
            if let Some(err) = release_err {
                return Err(err);
            }
        }
        Ok(summary)
    }

    fn run_case(&self, case: &TestCase, topology: &dyn Topology) -> Result<CaseVerdict> {
        let executor = topology.executor();

        let state: SetupState = match &case.setup {
            Some(setup) => setup(executor, &case.setup_db)?,
            None => Value::Null,
        };
        let ctx = CaseContext {
            state,
            args: case.args.clone(),
            topology: topology.context(),
        };

        let db = case.database.resolve(&ctx);
        let mut command = case.command.resolve(&ctx);
        if !command.is_object() {
            return Ok(CaseVerdict::Fail {
                reason: "command is not a document".to_string(),
                payload: command,
            });
        }
        if let Some(fields) = command.as_object_mut() {
            fields.insert("comment".to_string(), json!({"comment": true}));
        }

        let outcome = executor.run_command(&db, &command)?;
        let acceptable =
            outcome.ok || case.expect_fail || outcome.code == Some(COMMAND_NOT_SUPPORTED);

        if let Some(teardown) = &case.teardown {
            teardown(executor, &db, &outcome)?;
        }

        if acceptable {
            Ok(CaseVerdict::Pass)
        } else {
            Ok(CaseVerdict::Fail {
                reason: format!(
                    "unexpected outcome (ok={}, code={:?})",
                    outcome.ok, outcome.code
                ),
                payload: outcome.raw,
            })
        }
    }
}
