use anyhow::Result;
use migrator_core::config::{LogFormat, ObservabilityConfig};
use tracing_subscriber::EnvFilter;

/// Install the global subscriber. RUST_LOG, when set, wins over the configured level.
pub fn init(config: &ObservabilityConfig) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.log_level)?,
    };

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let installed = match config.log_format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Pretty => builder.try_init(),
    };
    installed.map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {}", e))
}
