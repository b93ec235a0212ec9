use std::time::Duration;

use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use tracing::debug;

use migrator_core::config::DatabaseConfig;
use migrator_core::error::{MigratorError, Result};

/// Owner of the tours database connection pool.
///
/// The pool connects lazily: no connection is opened until the first script runs.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a lazily connecting pool from configuration.
    pub fn from_config(config: &DatabaseConfig) -> Result<Self> {
        if config.url.trim().is_empty() {
            return Err(MigratorError::ConfigurationMissing("database.url".into()));
        }

        let pool = PgPoolOptions::new()
            .max_connections(config.pool_size.max(1))
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .connect_lazy_with(connect_options(&config.url)?);

        Ok(Self { pool })
    }

    /// Wrap an existing pool.
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Close all connections gracefully.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// Parse either a `postgres://` URL or a keyword connection string such as
/// `Host=localhost;Port=5432;Username=postgres;Password=pw;Database=tourbooking`.
pub fn connect_options(value: &str) -> Result<PgConnectOptions> {
    let value = value.trim();
    if value.starts_with("postgres://") || value.starts_with("postgresql://") {
        return value
            .parse()
            .map_err(|e| MigratorError::Database(format!("Invalid database URL: {}", e)));
    }

    let mut options = PgConnectOptions::new();
    for pair in value.split(';').map(str::trim).filter(|p| !p.is_empty()) {
        let (key, val) = pair.split_once('=').ok_or_else(|| {
            MigratorError::Database(format!("Invalid connection string segment '{}'", pair))
        })?;
        let val = val.trim();

        options = match key.trim().to_ascii_lowercase().as_str() {
            "host" | "server" => options.host(val),
            "port" => options.port(val.parse().map_err(|_| {
                MigratorError::Database(format!("Invalid port '{}' in connection string", val))
            })?),
            "username" | "user id" | "userid" | "user" => options.username(val),
            "password" | "pwd" => options.password(val),
            "database" => options.database(val),
            other => {
                debug!(key = other, "Ignoring connection string keyword");
                options
            }
        };
    }

    Ok(options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use migrator_core::ErrorKind;

    #[test]
    fn test_empty_url_is_configuration_missing() {
        let err = Database::from_config(&DatabaseConfig::default())
            .err()
            .expect("empty url rejected");
        assert_eq!(err.kind(), ErrorKind::ConfigurationMissing);
    }

    #[test]
    fn test_malformed_url_is_database_error() {
        let config = DatabaseConfig {
            url: "not a url".to_string(),
            ..Default::default()
        };
        let err = Database::from_config(&config).err().expect("bad url rejected");
        assert_eq!(err.kind(), ErrorKind::Database);
    }

    #[test]
    fn test_keyword_connection_string() {
        let options = connect_options(
            "Host=db.internal;Port=6543;Username=postgres;Password=pw;Database=tourbooking",
        )
        .unwrap();
        assert_eq!(options.get_host(), "db.internal");
        assert_eq!(options.get_port(), 6543);
        assert_eq!(options.get_username(), "postgres");
        assert_eq!(options.get_database(), Some("tourbooking"));
    }

    #[test]
    fn test_keyword_names_are_case_insensitive() {
        let options =
            connect_options("server=localhost; PORT=5433; User ID=app; DATABASE=tours;").unwrap();
        assert_eq!(options.get_host(), "localhost");
        assert_eq!(options.get_port(), 5433);
        assert_eq!(options.get_username(), "app");
        assert_eq!(options.get_database(), Some("tours"));
    }

    #[test]
    fn test_keyword_invalid_port_is_database_error() {
        let err = connect_options("Host=localhost;Port=abc;Database=tourbooking")
            .err()
            .expect("bad port rejected");
        assert_eq!(err.kind(), ErrorKind::Database);
    }

    #[test]
    fn test_url_connection_string() {
        let options = connect_options("postgres://postgres:pw@localhost:5432/tourbooking").unwrap();
        assert_eq!(options.get_host(), "localhost");
        assert_eq!(options.get_database(), Some("tourbooking"));
    }

    #[tokio::test]
    async fn test_keyword_string_builds_lazy_pool() {
        let config = DatabaseConfig {
            url: "Host=localhost;Port=5432;Username=postgres;Password=pw;Database=tourbooking"
                .to_string(),
            ..Default::default()
        };
        let db = Database::from_config(&config).unwrap();
        assert_eq!(db.pool().size(), 0);
        db.close().await;
    }

    #[tokio::test]
    async fn test_lazy_pool_opens_no_connection() {
        let config = DatabaseConfig {
            url: "postgres://postgres@localhost:5432/tourbooking".to_string(),
            ..Default::default()
        };
        let db = Database::from_config(&config).unwrap();
        assert_eq!(db.pool().size(), 0);
        db.close().await;
    }
}
