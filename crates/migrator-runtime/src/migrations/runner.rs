//! Run-once migration job.
//!
//! Discovers the scripts directory, applies the newest script, reports the outcome and
//! signals the host to stop. Only the single ordinal-latest script is executed and no
//! record of applied scripts is kept, so every run re-executes that script: scripts
//! must be idempotent (`CREATE TABLE IF NOT EXISTS`, ...). No advisory lock is taken
//! either; two runners started together against one database both execute.

use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use migrator_core::config::MigrationsConfig;
use migrator_core::error::{ErrorKind, MigratorError, Result};
use tokio::sync::watch;
use tokio::time::Instant as Deadline;
use tokio_util::sync::CancellationToken;
use tracing::{field, info_span, Instrument};
use uuid::Uuid;

use super::events::{ExecutionResult, RunState, RunnerEvents, TracingEvents};
use super::executor::ScriptExecutor;
use super::repository::{list_scripts, read_script};
use super::selector::MigrationBatch;
use crate::lifetime::HostLifetime;

/// Service name attached to the run span.
pub const SERVICE_NAME: &str = "migrationservice";

/// Orchestrates one migration run.
pub struct MigrationRunner {
    config: MigrationsConfig,
    executor: Arc<dyn ScriptExecutor>,
    events: Arc<dyn RunnerEvents>,
    lifetime: HostLifetime,
    state: watch::Sender<RunState>,
}

impl MigrationRunner {
    /// Create a runner that logs through `tracing`.
    pub fn new(
        config: MigrationsConfig,
        executor: Arc<dyn ScriptExecutor>,
        lifetime: HostLifetime,
    ) -> Self {
        let (state, _) = watch::channel(RunState::Idle);
        Self {
            config,
            executor,
            events: Arc::new(TracingEvents),
            lifetime,
            state,
        }
    }

    /// Replace the event sink.
    pub fn with_events(mut self, events: Arc<dyn RunnerEvents>) -> Self {
        self.events = events;
        self
    }

    /// Current state.
    pub fn state(&self) -> RunState {
        *self.state.borrow()
    }

    /// Watch state transitions.
    pub fn subscribe(&self) -> watch::Receiver<RunState> {
        self.state.subscribe()
    }

    /// Run the job to completion.
    ///
    /// Consumes the runner: a runner executes once. The host stop signal fires on
    /// both paths; on failure the error is returned after it has been logged.
    pub async fn run(self, cancel: CancellationToken) -> Result<ExecutionResult> {
        let span = info_span!(
            "migration",
            run_id = %Uuid::new_v4(),
            service = SERVICE_NAME,
            dir = field::Empty,
            script = field::Empty,
            status = field::Empty,
        );

        async {
            let started = Instant::now();
            self.events.runner_started();

            let mut selected = None;
            let outcome = self.execute_stages(&cancel, &mut selected).await;

            let result = match &outcome {
                Ok(()) => {
                    tracing::Span::current().record("status", "ok");
                    self.transition(RunState::Succeeded);
                    ExecutionResult::applied(selected.unwrap_or_default(), started.elapsed())
                }
                Err(e) => {
                    tracing::Span::current().record("status", "error");
                    self.events.failed(e);
                    self.transition(RunState::Failed);
                    ExecutionResult::failed(selected, e, started.elapsed())
                }
            };

            self.events.completed(&result);
            self.events.stopping();
            self.transition(RunState::Terminating);
            self.lifetime.stop_application();

            outcome.map(|()| result)
        }
        .instrument(span)
        .await
    }

    async fn execute_stages(
        &self,
        cancel: &CancellationToken,
        selected: &mut Option<String>,
    ) -> Result<()> {
        let dir = self
            .config
            .scripts_dir
            .as_deref()
            .ok_or_else(|| MigratorError::ConfigurationMissing("migrations.scripts_dir".into()))?;
        tracing::Span::current().record("dir", field::display(dir.display()));
        // A timeout too large to represent is no deadline at all.
        let deadline = self
            .config
            .timeout()
            .and_then(|t| Deadline::now().checked_add(t));

        self.transition(RunState::Discovering);
        let files = guarded(cancel, deadline, "discovering scripts", list_scripts(dir))
            .await
            .inspect_err(|e| self.report_discovery_error(e, dir))?;

        self.transition(RunState::Selecting);
        let batch = MigrationBatch::new(dir, files);
        let file = batch
            .selected()
            .cloned()
            .ok_or_else(|| MigratorError::NoScriptsFound {
                path: dir.to_path_buf(),
            })?;
        tracing::Span::current().record("script", file.name.as_str());
        *selected = Some(file.name.clone());

        self.transition(RunState::Reading);
        let script = guarded(cancel, deadline, "reading script", read_script(&file))
            .await
            .inspect_err(|e| {
                if e.kind() == ErrorKind::EmptyScript {
                    self.events.empty_script(&file.path);
                }
            })?;

        self.transition(RunState::Executing);
        self.events.applying(&script.name);
        guarded(cancel, deadline, "executing script", async {
            self.executor
                .execute(&script.content)
                .await
                .map_err(|source| MigratorError::ExecutionFailed {
                    script: script.name.clone(),
                    source,
                })
        })
        .await?;
        self.events.applied(&script.name);

        Ok(())
    }

    fn report_discovery_error(&self, err: &MigratorError, dir: &Path) {
        match err.kind() {
            ErrorKind::DirectoryNotFound => self.events.directory_not_found(dir),
            ErrorKind::NoScriptsFound => self.events.no_scripts_found(dir),
            _ => {}
        }
    }

    fn transition(&self, to: RunState) {
        let from = self.state.send_replace(to);
        self.events.state_changed(from, to);
    }
}

/// Await `fut` unless `cancel` fires or `deadline` passes first.
async fn guarded<T>(
    cancel: &CancellationToken,
    deadline: Option<Deadline>,
    stage: &str,
    fut: impl Future<Output = Result<T>>,
) -> Result<T> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(MigratorError::cancelled(format!(
            "cancellation requested while {}",
            stage
        ))),
        _ = deadline_elapsed(deadline) => Err(MigratorError::cancelled(format!(
            "deadline elapsed while {}",
            stage
        ))),
        result = fut => result,
    }
}

async fn deadline_elapsed(deadline: Option<Deadline>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockExecutor, RecordingEvents};
    use std::time::Duration;

    #[tokio::test]
    async fn test_guarded_passes_result_through() {
        let cancel = CancellationToken::new();
        let value = guarded(&cancel, None, "testing", async { Ok(7) }).await.unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn test_guarded_prefers_cancellation() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = guarded(&cancel, None, "testing", async { Ok(()) })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Cancelled);
        assert!(err.to_string().contains("cancellation requested while testing"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_guarded_deadline() {
        let cancel = CancellationToken::new();
        let deadline = Some(Deadline::now() + Duration::from_secs(5));
        let err = guarded(&cancel, deadline, "executing script", async {
            std::future::pending::<Result<()>>().await
        })
        .await
        .unwrap_err();
        assert!(err.to_string().contains("deadline elapsed while executing script"));
    }

    #[tokio::test]
    async fn test_missing_scripts_dir_fails_before_discovery() {
        let executor = MockExecutor::succeeding();
        let events = RecordingEvents::new();
        let lifetime = HostLifetime::new();
        let runner = MigrationRunner::new(
            MigrationsConfig::default(),
            Arc::new(executor.clone()),
            lifetime.clone(),
        )
        .with_events(Arc::new(events.clone()));

        let err = runner.run(CancellationToken::new()).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::ConfigurationMissing);
        assert_eq!(
            events.states(),
            vec![RunState::Failed, RunState::Terminating]
        );
        assert_eq!(executor.call_count(), 0);
        assert!(lifetime.is_stopping());
    }

    #[tokio::test]
    async fn test_unrepresentable_timeout_runs_without_deadline() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("0001_init.sql"), "SELECT 1;").unwrap();
        let config = MigrationsConfig {
            timeout_secs: u64::MAX,
            ..MigrationsConfig::with_scripts_dir(dir.path())
        };
        let executor = MockExecutor::succeeding();
        let lifetime = HostLifetime::new();
        let runner = MigrationRunner::new(config, Arc::new(executor.clone()), lifetime.clone())
            .with_events(Arc::new(RecordingEvents::new()));

        let result = runner.run(CancellationToken::new()).await.unwrap();

        assert!(result.is_applied());
        assert_eq!(executor.calls(), vec!["SELECT 1;"]);
        assert!(lifetime.is_stopping());
    }

    #[test]
    fn test_new_runner_is_idle() {
        let runner = MigrationRunner::new(
            MigrationsConfig::with_scripts_dir("MigrationScripts"),
            Arc::new(MockExecutor::succeeding()),
            HostLifetime::new(),
        );
        assert_eq!(runner.state(), RunState::Idle);
        assert_eq!(*runner.subscribe().borrow(), RunState::Idle);
    }
}
