use serde::{Deserialize, Serialize};

/// Database configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Connection URL of the tours database.
    #[serde(default)]
    pub url: String,

    /// Connection pool size. A run uses one connection at a time.
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,

    /// Connection checkout timeout in seconds.
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            pool_size: default_pool_size(),
            acquire_timeout_secs: default_acquire_timeout(),
        }
    }
}

fn default_pool_size() -> u32 {
    1
}

fn default_acquire_timeout() -> u64 {
    30
}
