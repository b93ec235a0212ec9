mod plan;
mod run;

pub use plan::PlanCommand;
pub use run::RunCommand;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use migrator_core::config::{MigratorConfig, SCRIPTS_DIR_ENV};

/// Config file read when `--config` is not given. Optional.
pub const DEFAULT_CONFIG: &str = "migrator.toml";

/// Tour catalog database migrator.
///
/// Applies the newest script from the scripts directory, then exits.
#[derive(Parser)]
#[command(name = "migrator")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Apply the latest migration script and exit (default).
    Run(RunCommand),

    /// Show which script a run would apply, without touching the database.
    Plan(PlanCommand),
}

/// Options shared by every command.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Configuration file path [default: migrator.toml, skipped if absent].
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding the `*.sql` migration scripts.
    #[arg(short = 'd', long, env = SCRIPTS_DIR_ENV, global = true)]
    pub scripts_dir: Option<PathBuf>,

    /// Database connection URL.
    #[arg(long, env = "DATABASE_URL", hide_env_values = true, global = true)]
    pub database_url: Option<String>,

    /// Deadline for the whole run in seconds (0 disables it).
    #[arg(long, global = true)]
    pub timeout_secs: Option<u64>,
}

impl GlobalArgs {
    /// Load configuration: file, then environment, then command-line flags.
    pub fn load_config(&self) -> Result<MigratorConfig> {
        dotenvy::dotenv().ok();
        self.load_config_with(|key| std::env::var(key).ok())
    }

    /// Same as [`load_config`](Self::load_config), resolving overrides through `lookup`.
    pub fn load_config_with(
        &self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<MigratorConfig> {
        let mut config = match &self.config {
            Some(path) => MigratorConfig::load(path, true)?,
            None => MigratorConfig::load(DEFAULT_CONFIG, false)?,
        };
        config.apply_overrides_from(lookup);
        self.apply_to(&mut config);
        Ok(config)
    }

    fn apply_to(&self, config: &mut MigratorConfig) {
        if let Some(dir) = &self.scripts_dir {
            config.migrations.scripts_dir = Some(dir.clone());
        }
        if let Some(url) = &self.database_url {
            config.database.url = url.clone();
        }
        if let Some(secs) = self.timeout_secs {
            config.migrations.timeout_secs = secs;
        }
    }
}

impl Cli {
    /// Execute the CLI command.
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Some(Commands::Run(cmd)) => cmd.execute(&self.global).await,
            Some(Commands::Plan(cmd)) => cmd.execute(&self.global).await,
            None => RunCommand::default().execute(&self.global).await,
        }
    }
}
