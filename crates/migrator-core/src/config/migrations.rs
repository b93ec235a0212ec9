use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Migration script discovery and execution settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationsConfig {
    /// Directory holding the `*.sql` scripts. Required before a run starts.
    ///
    /// Script names must carry a fixed-width, zero-padded version prefix
    /// (`0001_init.sql`, `0010_add_index.sql`): selection compares names as strings,
    /// so `10_x.sql` sorts before `2_x.sql`.
    #[serde(default)]
    pub scripts_dir: Option<PathBuf>,

    /// Deadline in seconds for the whole run (file I/O plus the database call).
    /// `0` disables the deadline.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for MigrationsConfig {
    fn default() -> Self {
        Self {
            scripts_dir: None,
            timeout_secs: default_timeout(),
        }
    }
}

impl MigrationsConfig {
    pub fn with_scripts_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            scripts_dir: Some(dir.into()),
            ..Default::default()
        }
    }

    /// The run deadline, or `None` when disabled.
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

fn default_timeout() -> u64 {
    300
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_has_no_scripts_dir() {
        let config = MigrationsConfig::default();
        assert!(config.scripts_dir.is_none());
        assert_eq!(config.timeout(), Some(Duration::from_secs(300)));
    }

    #[test]
    fn test_zero_timeout_disables_deadline() {
        let config = MigrationsConfig {
            timeout_secs: 0,
            ..MigrationsConfig::with_scripts_dir("MigrationScripts")
        };
        assert_eq!(config.timeout(), None);
    }
}
