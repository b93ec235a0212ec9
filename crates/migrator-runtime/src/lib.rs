pub mod db;
pub mod lifetime;
pub mod migrations;
pub mod testing;

pub use db::Database;
pub use lifetime::HostLifetime;
pub use migrations::{
    ExecutionOutcome, ExecutionResult, MigrationBatch, MigrationRunner, PgScriptExecutor,
    RunState, RunnerEvents, ScriptExecutor, TracingEvents,
};
