use std::collections::BTreeSet;

use anyhow::Result;
use clap::Args;
use console::style;

use migrator_core::MigratorConfig;
use migrator_runtime::migrations::{list_scripts, MigrationBatch, ScriptFile};

use super::GlobalArgs;

/// Show which script a run would apply, without touching the database.
#[derive(Args, Debug, Default)]
pub struct PlanCommand {}

impl PlanCommand {
    pub async fn execute(self, global: &GlobalArgs) -> Result<()> {
        let config = global.load_config()?;
        self.show(&config).await
    }

    async fn show(&self, config: &MigratorConfig) -> Result<()> {
        let dir = config.scripts_dir()?;

        let batch = MigrationBatch::new(dir, list_scripts(dir).await?);

        println!();
        println!(
            "  {}  Migration plan for {}",
            style("⚒️").bold(),
            style(dir.display()).cyan()
        );
        println!();

        for (i, script) in batch.candidates.iter().enumerate() {
            if i == 0 {
                println!(
                    "    {} {} {}",
                    style("→").green(),
                    style(&script.name).green().bold(),
                    style("(will apply)").dim()
                );
            } else {
                println!("    {} {}", style("-").dim(), style(&script.name).dim());
            }
        }

        let widths = prefix_widths(&batch.candidates);
        if widths.len() > 1 {
            println!();
            println!(
                "  {} Version prefixes have different widths ({}). Scripts are ordered as \
                 strings, so pad prefixes with zeros to the same width.",
                style("⚠").yellow(),
                widths
                    .iter()
                    .map(|w| w.to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }

        println!();
        println!(
            "  {} {} script(s) found, only the first is applied",
            style("ℹ").blue(),
            batch.candidates.len()
        );
        println!();
        Ok(())
    }
}

/// Distinct lengths of the leading digit runs, ignoring names without one.
fn prefix_widths(scripts: &[ScriptFile]) -> BTreeSet<usize> {
    scripts
        .iter()
        .map(|s| s.name.bytes().take_while(u8::is_ascii_digit).count())
        .filter(|&width| width > 0)
        .collect()
}
