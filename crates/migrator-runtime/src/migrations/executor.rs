use std::future::Future;
use std::pin::Pin;

use sqlx::PgPool;
use tracing::debug;

/// Runs one SQL script against the target database as a single command.
///
/// Implementations send the text verbatim: no statement splitting and no implicit
/// transaction. A script that needs atomicity issues its own `BEGIN`/`COMMIT`.
/// Driver errors are returned unchanged.
pub trait ScriptExecutor: Send + Sync {
    fn execute<'a>(
        &'a self,
        sql: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<(), sqlx::Error>> + Send + 'a>>;
}

/// Executes scripts on a PostgreSQL pool owned by the caller.
#[derive(Clone)]
pub struct PgScriptExecutor {
    pool: PgPool,
}

impl PgScriptExecutor {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl ScriptExecutor for PgScriptExecutor {
    fn execute<'a>(
        &'a self,
        sql: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<(), sqlx::Error>> + Send + 'a>> {
        Box::pin(async move {
            // The pool opens a connection on demand and keeps it after the call.
            // Simple-query protocol, so a multi-statement script is one round trip.
            let result = sqlx::raw_sql(sql).execute(&self.pool).await?;
            debug!(
                rows_affected = result.rows_affected(),
                bytes = sql.len(),
                "Script executed"
            );
            Ok(())
        })
    }
}
