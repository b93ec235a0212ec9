mod events;
mod executor;
mod repository;
mod runner;
mod selector;

pub use events::{ExecutionOutcome, ExecutionResult, RunState, RunnerEvents, TracingEvents};
pub use executor::{PgScriptExecutor, ScriptExecutor};
pub use repository::{list_scripts, read_script, MigrationScript, ScriptFile};
pub use runner::{MigrationRunner, SERVICE_NAME};
pub use selector::{select_latest, MigrationBatch};
