//! Event sink that records runner milestones.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use migrator_core::MigratorError;

use crate::migrations::{ExecutionResult, RunState, RunnerEvents};

/// A captured runner event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedEvent {
    Started,
    StateChanged(RunState),
    DirectoryNotFound(PathBuf),
    NoScriptsFound(PathBuf),
    EmptyScript(PathBuf),
    Applying(String),
    Applied(String),
    Failed(String),
    Completed { script: Option<String>, applied: bool },
    Stopping,
}

/// Records every event in order.
#[derive(Clone, Default)]
pub struct RecordingEvents {
    events: Arc<Mutex<Vec<RecordedEvent>>>,
}

impl RecordingEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<RecordedEvent> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// States entered, in order.
    pub fn states(&self) -> Vec<RunState> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                RecordedEvent::StateChanged(state) => Some(state),
                _ => None,
            })
            .collect()
    }

    /// Scripts reported as applied.
    pub fn applied(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                RecordedEvent::Applied(name) => Some(name),
                _ => None,
            })
            .collect()
    }

    pub fn contains(&self, event: &RecordedEvent) -> bool {
        self.events().contains(event)
    }

    fn push(&self, event: RecordedEvent) {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(event);
    }
}

impl RunnerEvents for RecordingEvents {
    fn runner_started(&self) {
        self.push(RecordedEvent::Started);
    }

    fn state_changed(&self, _from: RunState, to: RunState) {
        self.push(RecordedEvent::StateChanged(to));
    }

    fn directory_not_found(&self, path: &Path) {
        self.push(RecordedEvent::DirectoryNotFound(path.to_path_buf()));
    }

    fn no_scripts_found(&self, path: &Path) {
        self.push(RecordedEvent::NoScriptsFound(path.to_path_buf()));
    }

    fn empty_script(&self, path: &Path) {
        self.push(RecordedEvent::EmptyScript(path.to_path_buf()));
    }

    fn applying(&self, script: &str) {
        self.push(RecordedEvent::Applying(script.to_string()));
    }

    fn applied(&self, script: &str) {
        self.push(RecordedEvent::Applied(script.to_string()));
    }

    fn failed(&self, error: &MigratorError) {
        self.push(RecordedEvent::Failed(error.to_string()));
    }

    fn completed(&self, result: &ExecutionResult) {
        self.push(RecordedEvent::Completed {
            script: result.script_name.clone(),
            applied: result.is_applied(),
        });
    }

    fn stopping(&self) {
        self.push(RecordedEvent::Stopping);
    }
}
