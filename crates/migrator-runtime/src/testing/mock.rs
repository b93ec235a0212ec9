//! Script executor mock.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use crate::migrations::ScriptExecutor;

/// How the mock answers each call.
#[derive(Debug, Clone)]
enum Behavior {
    Succeed,
    Fail(String),
    Hang,
}

/// Mock executor that records every script it receives.
#[derive(Clone)]
pub struct MockExecutor {
    behavior: Behavior,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockExecutor {
    /// Accept every script.
    pub fn succeeding() -> Self {
        Self::with_behavior(Behavior::Succeed)
    }

    /// Reject every script with `sqlx::Error::Protocol(message)`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self::with_behavior(Behavior::Fail(message.into()))
    }

    /// Never complete, to exercise cancellation and deadlines.
    pub fn hanging() -> Self {
        Self::with_behavior(Behavior::Hang)
    }

    fn with_behavior(behavior: Behavior) -> Self {
        Self {
            behavior,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Scripts received so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls().len()
    }
}

impl ScriptExecutor for MockExecutor {
    fn execute<'a>(
        &'a self,
        sql: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<(), sqlx::Error>> + Send + 'a>> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(sql.to_string());

        let behavior = self.behavior.clone();
        Box::pin(async move {
            match behavior {
                Behavior::Succeed => Ok(()),
                Behavior::Fail(message) => Err(sqlx::Error::Protocol(message)),
                Behavior::Hang => std::future::pending().await,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_records_calls() {
        let executor = MockExecutor::succeeding();
        executor.execute("SELECT 1;").await.unwrap();
        executor.execute("SELECT 2;").await.unwrap();
        assert_eq!(executor.calls(), vec!["SELECT 1;", "SELECT 2;"]);
    }

    #[tokio::test]
    async fn test_failing_returns_protocol_error() {
        let executor = MockExecutor::failing("boom");
        let err = executor.execute("SELECT 1;").await.unwrap_err();
        assert!(matches!(err, sqlx::Error::Protocol(ref m) if m == "boom"));
        assert_eq!(executor.call_count(), 1);
    }
}
