//! Test doubles for driving the runner without a database.
//!
//! ```ignore
//! let executor = MockExecutor::failing("relation \"tours\" already exists");
//! let events = RecordingEvents::new();
//! let runner = MigrationRunner::new(config, Arc::new(executor.clone()), HostLifetime::new())
//!     .with_events(Arc::new(events.clone()));
//! ```

mod events;
mod mock;

pub use events::{RecordedEvent, RecordingEvents};
pub use mock::MockExecutor;
