use std::fmt;

use serde_json::Value;

use crate::errors::Result;
use crate::topology::{CommandExecutor, CommandOutcome, TopologyContext};

/// State produced by a case's setup hook and threaded into later resolution.
pub type SetupState = Value;

/// Everything a derived field can depend on: setup state, the case's
/// declared arguments, and topology metadata from the active deployment.
#[derive(Debug, Clone)]
pub struct CaseContext {
    pub state: SetupState,
    pub args: Value,
    pub topology: TopologyContext,
}

/// A case field that is either a fixed value or derived from the context.
///
/// Replaces callable-vs-value duck typing with a tagged variant; both shapes
/// go through the one [`Provided::resolve`] dispatch.
pub enum Provided<T> {
    Static(T),
    Derived(Box<dyn Fn(&CaseContext) -> T + Send + Sync>),
}

impl<T: Clone> Provided<T> {
    pub fn resolve(&self, ctx: &CaseContext) -> T {
        match self {
            Self::Static(value) => value.clone(),
            Self::Derived(build) => build(ctx),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Provided<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(value) => f.debug_tuple("Static").field(value).finish(),
            Self::Derived(_) => f.write_str("Derived(..)"),
        }
    }
}

/// Hook run before the command; returns state for derived resolution.
pub type SetupHook = Box<dyn Fn(&dyn CommandExecutor, &str) -> Result<SetupState> + Send + Sync>;

/// Hook run after the command with the raw outcome.
pub type TeardownHook =
    Box<dyn Fn(&dyn CommandExecutor, &str, &CommandOutcome) -> Result<()> + Send + Sync>;

/// One entry of the conformance table.
///
/// Cases are supplied by an external library and consumed read-only; the
/// runner never mutates them between topologies.
pub struct TestCase {
    pub name: String,
    /// Database the setup hook runs against.
    pub setup_db: String,
    /// Target database for the command, resolved after setup.
    pub database: Provided<String>,
    /// Command document, resolved after setup.
    pub command: Provided<Value>,
    /// Declared arguments forwarded to derived fields.
    pub args: Value,
    pub setup: Option<SetupHook>,
    pub teardown: Option<TeardownHook>,
    /// The command is allowed to fail for this case.
    pub expect_fail: bool,
    /// Subsystem whose failpoint is enabled for the duration of the case.
    pub failpoint: Option<String>,
}

impl TestCase {
    /// Case running a fixed command against a fixed database.
    pub fn new(name: impl Into<String>, db: impl Into<String>, command: Value) -> Self {
        let db = db.into();
        Self {
            name: name.into(),
            setup_db: db.clone(),
            database: Provided::Static(db),
            command: Provided::Static(command),
            args: Value::Null,
            setup: None,
            teardown: None,
            expect_fail: false,
            failpoint: None,
        }
    }

    pub fn with_setup(mut self, hook: SetupHook) -> Self {
        self.setup = Some(hook);
        self
    }

    pub fn with_teardown(mut self, hook: TeardownHook) -> Self {
        self.teardown = Some(hook);
        self
    }

    pub fn with_database(mut self, database: Provided<String>) -> Self {
        self.database = database;
        self
    }

    pub fn with_command(mut self, command: Provided<Value>) -> Self {
        self.command = command;
        self
    }

    pub fn with_args(mut self, args: Value) -> Self {
        self.args = args;
        self
    }

    pub fn expect_fail(mut self) -> Self {
        self.expect_fail = true;
        self
    }

    pub fn with_failpoint(mut self, subsystem: impl Into<String>) -> Self {
        self.failpoint = Some(subsystem.into());
        self
    }
}

impl fmt::Debug for TestCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestCase")
            .field("name", &self.name)
            .field("setup_db", &self.setup_db)
            .field("database", &self.database)
            .field("command", &self.command)
            .field("expect_fail", &self.expect_fail)
            .field("failpoint", &self.failpoint)
            .finish_non_exhaustive()
    }
}
