use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use migrator_runtime::{Database, HostLifetime, MigrationRunner, PgScriptExecutor};

use super::GlobalArgs;
use crate::telemetry;

/// Apply the latest migration script and exit.
#[derive(Args, Debug, Default)]
pub struct RunCommand {}

impl RunCommand {
    /// Execute the run command.
    ///
    /// Any failure is returned so the process exits non-zero and dependent services
    /// waiting on this job do not start.
    pub async fn execute(self, global: &GlobalArgs) -> Result<()> {
        let config = global.load_config()?;
        telemetry::init(&config.observability)?;

        let database = Database::from_config(&config.database)?;
        let executor = Arc::new(PgScriptExecutor::new(database.pool().clone()));
        let lifetime = HostLifetime::new();
        let cancel = CancellationToken::new();

        // Ctrl-C cancels the run; the watcher exits once the runner signals stop.
        let interrupt = {
            let cancel = cancel.clone();
            let lifetime = lifetime.clone();
            tokio::spawn(async move {
                tokio::select! {
                    signal = tokio::signal::ctrl_c() => {
                        if signal.is_ok() {
                            warn!("Interrupt received, cancelling migration");
                            cancel.cancel();
                        }
                    }
                    _ = lifetime.stopped() => {}
                }
            })
        };

        let runner = MigrationRunner::new(config.migrations.clone(), executor, lifetime.clone());
        let result = tokio::spawn(runner.run(cancel))
            .await
            .context("Migration task aborted")?;

        let _ = interrupt.await;
        database.close().await;

        let result = result?;
        info!(
            script = result.script_name.as_deref().unwrap_or("-"),
            elapsed_ms = result.elapsed.as_millis() as u64,
            "Migration job finished"
        );
        Ok(())
    }
}
