pub mod config;
pub mod error;

pub use config::MigratorConfig;
pub use error::{ErrorKind, MigratorError, Result};
