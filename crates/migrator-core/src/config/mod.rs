mod database;
mod migrations;
mod observability;

pub use database::DatabaseConfig;
pub use migrations::MigrationsConfig;
pub use observability::{LogFormat, ObservabilityConfig};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{MigratorError, Result};

/// Environment variable overriding `migrations.scripts_dir`.
pub const SCRIPTS_DIR_ENV: &str = "MIGRATOR_SCRIPTS_DIR";

/// Environment variables consulted for `database.url`, in priority order.
/// The second is the connection string name injected by the orchestrator.
pub const DATABASE_URL_ENVS: [&str; 2] = ["DATABASE_URL", "ConnectionStrings__tourbooking"];

/// Root configuration for the migrator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MigratorConfig {
    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Script discovery and execution.
    #[serde(default)]
    pub migrations: MigrationsConfig,

    /// Logging configuration.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl MigratorConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| MigratorError::Config(format!("Failed to read config file: {}", e)))?;

        Self::parse_toml(&content)
    }

    /// Load from `path`, falling back to defaults when the file is absent and
    /// `required` is false.
    pub fn load(path: impl AsRef<Path>, required: bool) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            if required {
                return Err(MigratorError::Config(format!(
                    "Configuration file not found: {}",
                    path.display()
                )));
            }
            return Ok(Self::default());
        }
        Self::from_file(path)
    }

    /// Parse configuration from a TOML string.
    pub fn parse_toml(content: &str) -> Result<Self> {
        let content = substitute_env_vars(content);

        toml::from_str(&content)
            .map_err(|e| MigratorError::Config(format!("Failed to parse config: {}", e)))
    }

    /// Apply overrides from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides using `lookup` to resolve variable names.
    pub fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(dir) = lookup(SCRIPTS_DIR_ENV).filter(|v| !v.trim().is_empty()) {
            self.migrations.scripts_dir = Some(PathBuf::from(dir));
        }

        if let Some(url) = DATABASE_URL_ENVS
            .iter()
            .find_map(|key| lookup(key).filter(|v| !v.trim().is_empty()))
        {
            self.database.url = url;
        }
    }

    /// The configured scripts directory.
    pub fn scripts_dir(&self) -> Result<&Path> {
        self.migrations
            .scripts_dir
            .as_deref()
            .ok_or_else(|| MigratorError::ConfigurationMissing("migrations.scripts_dir".into()))
    }

    /// The configured database URL.
    pub fn database_url(&self) -> Result<&str> {
        if self.database.url.trim().is_empty() {
            return Err(MigratorError::ConfigurationMissing("database.url".into()));
        }
        Ok(&self.database.url)
    }
}

/// Substitute environment variables in the format ${VAR_NAME}.
fn substitute_env_vars(content: &str) -> String {
    let mut result = content.to_string();
    let re = regex_lite::Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}")
        .expect("env var pattern is valid");

    for cap in re.captures_iter(content) {
        let var_name = &cap[1];
        if let Ok(value) = std::env::var(var_name) {
            result = result.replace(&cap[0], &value);
        }
    }

    result
}
