//! Event sink for the migration runner.
//!
//! The runner reports every milestone through a [`RunnerEvents`] handed to it at
//! construction, so tests can observe a run without a global subscriber.

use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Utc};
use migrator_core::MigratorError;
use tracing::{debug, error, info, warn};

/// Runner states, in the order a successful run visits them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Discovering,
    Selecting,
    Reading,
    Executing,
    Succeeded,
    Failed,
    Terminating,
}

impl RunState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Discovering => "discovering",
            Self::Selecting => "selecting",
            Self::Reading => "reading",
            Self::Executing => "executing",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Terminating => "terminating",
        }
    }
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionOutcome {
    Applied,
    Failed(String),
}

/// Summary of one run. Not persisted anywhere.
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    /// The selected script, if the run got as far as selection.
    pub script_name: Option<String>,
    pub outcome: ExecutionOutcome,
    pub elapsed: Duration,
    pub finished_at: DateTime<Utc>,
}

impl ExecutionResult {
    pub fn applied(script_name: impl Into<String>, elapsed: Duration) -> Self {
        Self {
            script_name: Some(script_name.into()),
            outcome: ExecutionOutcome::Applied,
            elapsed,
            finished_at: Utc::now(),
        }
    }

    pub fn failed(script_name: Option<String>, error: &MigratorError, elapsed: Duration) -> Self {
        Self {
            script_name,
            outcome: ExecutionOutcome::Failed(error.to_string()),
            elapsed,
            finished_at: Utc::now(),
        }
    }

    pub fn is_applied(&self) -> bool {
        self.outcome == ExecutionOutcome::Applied
    }
}

/// Receives runner milestones.
pub trait RunnerEvents: Send + Sync {
    fn runner_started(&self);

    fn state_changed(&self, _from: RunState, _to: RunState) {}

    fn directory_not_found(&self, path: &Path);

    fn no_scripts_found(&self, path: &Path);

    fn empty_script(&self, path: &Path);

    /// Logged immediately before the script is sent to the database.
    fn applying(&self, script: &str);

    fn applied(&self, script: &str);

    fn failed(&self, error: &MigratorError);

    fn completed(&self, _result: &ExecutionResult) {}

    fn stopping(&self);
}

/// Emits runner milestones as `tracing` events with stable `event` names.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingEvents;

impl RunnerEvents for TracingEvents {
    fn runner_started(&self) {
        info!(event = "MigratorStart", "Migrator started");
    }

    fn state_changed(&self, from: RunState, to: RunState) {
        debug!(from = from.as_str(), to = to.as_str(), "Runner state changed");
    }

    fn directory_not_found(&self, path: &Path) {
        warn!(
            event = "MigrationsDirectoryDoesNotExist",
            path = %path.display(),
            "The directory '{}' does not exist",
            path.display()
        );
    }

    fn no_scripts_found(&self, path: &Path) {
        warn!(
            event = "NoMigrationScriptFound",
            path = %path.display(),
            "No migration script found in '{}'",
            path.display()
        );
    }

    fn empty_script(&self, path: &Path) {
        warn!(
            event = "MigrationScriptEmpty",
            path = %path.display(),
            "Migration script '{}' is empty",
            path.display()
        );
    }

    fn applying(&self, script: &str) {
        info!(event = "ApplyingMigration", script, "Applying migration script '{}'", script);
    }

    fn applied(&self, script: &str) {
        info!(
            event = "MigrationApplied",
            script,
            "Migration script '{}' applied successfully",
            script
        );
    }

    fn failed(&self, err: &MigratorError) {
        error!(
            event = "MigrationFailed",
            kind = ?err.kind(),
            error = %err,
            "Migration failed"
        );
    }

    fn completed(&self, result: &ExecutionResult) {
        debug!(
            script = result.script_name.as_deref().unwrap_or("-"),
            outcome = ?result.outcome,
            elapsed_ms = result.elapsed.as_millis() as u64,
            "Migration run completed"
        );
    }

    fn stopping(&self) {
        info!(event = "MigratorStopping", "Migrator is stopping");
    }
}
