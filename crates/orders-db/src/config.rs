//! # Database Configuration
//!
//! Where the store lives and how each unit-of-work connection is opened.
//!
//! Configuration is built in code or loaded from environment variables with
//! fallback to defaults.
//!
//! | Variable                    | Default     |
//! |-----------------------------|-------------|
//! | `ORDERS_DB_PATH`            | `orders.db` |
//! | `ORDERS_DB_BUSY_TIMEOUT_MS` | `5000`      |
//! | `ORDERS_DB_ENSURE_SCHEMA`   | `true`      |

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqliteSynchronous};

/// Default database file, relative to the working directory.
pub const DEFAULT_DB_PATH: &str = "orders.db";

// =============================================================================
// Configuration
// =============================================================================

/// Database configuration.
///
/// ## Example
/// ```rust
/// use std::time::Duration;
/// use orders_db::DbConfig;
///
/// let config = DbConfig::new("./data/orders.db")
///     .busy_timeout(Duration::from_secs(1))
///     .ensure_schema(false);
///
/// assert_eq!(config.busy_timeout, Duration::from_secs(1));
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Path to the SQLite database file.
    pub database_path: PathBuf,

    /// How long a statement waits on a locked database before failing.
    /// Default: 5 seconds
    pub busy_timeout: Duration,

    /// Enforce `Position.position_id → Orders.id`.
    /// Default: true
    pub foreign_keys: bool,

    /// Create the database file if it doesn't exist.
    /// Default: true
    pub create_if_missing: bool,

    /// Whether [`crate::Database::new`] creates missing tables.
    /// Default: true
    pub ensure_schema: bool,
}

impl DbConfig {
    /// Creates a new configuration for the given database file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            busy_timeout: Duration::from_secs(5),
            foreign_keys: true,
            create_if_missing: true,
            ensure_schema: true,
        }
    }

    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        DbConfig::from_lookup(|key| env::var(key).ok())
    }

    /// Loads configuration from any key/value source, `None` meaning unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let path = lookup("ORDERS_DB_PATH").unwrap_or_else(|| DEFAULT_DB_PATH.to_string());
        if path.trim().is_empty() {
            return Err(ConfigError::InvalidValue("ORDERS_DB_PATH".to_string()));
        }

        let busy_timeout_ms: u64 = lookup("ORDERS_DB_BUSY_TIMEOUT_MS")
            .unwrap_or_else(|| "5000".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("ORDERS_DB_BUSY_TIMEOUT_MS".to_string()))?;

        let ensure_schema: bool = lookup("ORDERS_DB_ENSURE_SCHEMA")
            .unwrap_or_else(|| "true".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("ORDERS_DB_ENSURE_SCHEMA".to_string()))?;

        Ok(DbConfig::new(path)
            .busy_timeout(Duration::from_millis(busy_timeout_ms))
            .ensure_schema(ensure_schema))
    }

    /// Sets the busy timeout.
    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    /// Sets whether foreign keys are enforced.
    pub fn foreign_keys(mut self, enabled: bool) -> Self {
        self.foreign_keys = enabled;
        self
    }

    /// Sets whether a missing database file is created.
    pub fn create_if_missing(mut self, create: bool) -> Self {
        self.create_if_missing = create;
        self
    }

    /// Sets whether missing tables are created on startup.
    pub fn ensure_schema(mut self, ensure: bool) -> Self {
        self.ensure_schema = ensure;
        self
    }

    /// Connection options for one unit-of-work connection.
    ///
    /// ## SQLite Settings
    /// - WAL mode: a reader in one unit-of-work doesn't block a writer in another
    /// - NORMAL synchronous: durable against corruption, may lose the last
    ///   commit on power loss
    pub fn connect_options(&self) -> SqliteConnectOptions {
        SqliteConnectOptions::new()
            .filename(&self.database_path)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(self.foreign_keys)
            .busy_timeout(self.busy_timeout)
            .create_if_missing(self.create_if_missing)
    }
}

impl Default for DbConfig {
    fn default() -> Self {
        DbConfig::new(DEFAULT_DB_PATH)
    }
}

/// Configuration error types.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = DbConfig::new("/tmp/orders-test.db")
            .busy_timeout(Duration::from_millis(250))
            .foreign_keys(false)
            .create_if_missing(false)
            .ensure_schema(false);

        assert_eq!(config.database_path, PathBuf::from("/tmp/orders-test.db"));
        assert_eq!(config.busy_timeout, Duration::from_millis(250));
        assert!(!config.foreign_keys);
        assert!(!config.create_if_missing);
        assert!(!config.ensure_schema);
    }

    #[test]
    fn test_defaults() {
        let config = DbConfig::default();
        assert_eq!(config.database_path, PathBuf::from(DEFAULT_DB_PATH));
        assert_eq!(config.busy_timeout, Duration::from_secs(5));
        assert!(config.foreign_keys);
        assert!(config.ensure_schema);
    }

    fn lookup<'a>(vars: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |key: &str| {
            vars.iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn test_from_lookup_defaults() {
        let config = DbConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.database_path, PathBuf::from(DEFAULT_DB_PATH));
        assert_eq!(config.busy_timeout, Duration::from_secs(5));
        assert!(config.ensure_schema);
    }

    #[test]
    fn test_from_lookup_reads_values() {
        let config = DbConfig::from_lookup(lookup(&[
            ("ORDERS_DB_PATH", "/var/lib/orders/store.db"),
            ("ORDERS_DB_BUSY_TIMEOUT_MS", "750"),
            ("ORDERS_DB_ENSURE_SCHEMA", "false"),
        ]))
        .unwrap();

        assert_eq!(config.database_path, PathBuf::from("/var/lib/orders/store.db"));
        assert_eq!(config.busy_timeout, Duration::from_millis(750));
        assert!(!config.ensure_schema);
    }

    #[test]
    fn test_from_lookup_rejects_invalid_values() {
        let err = DbConfig::from_lookup(lookup(&[("ORDERS_DB_BUSY_TIMEOUT_MS", "soon")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidValue("ORDERS_DB_BUSY_TIMEOUT_MS".to_string())
        );

        let err = DbConfig::from_lookup(lookup(&[("ORDERS_DB_ENSURE_SCHEMA", "yes")])).unwrap_err();
        assert_eq!(err, ConfigError::InvalidValue("ORDERS_DB_ENSURE_SCHEMA".to_string()));

        let err = DbConfig::from_lookup(lookup(&[("ORDERS_DB_PATH", "  ")])).unwrap_err();
        assert_eq!(err, ConfigError::InvalidValue("ORDERS_DB_PATH".to_string()));
    }

    #[test]
    fn test_from_env_reads_process_environment() {
        // Only this test touches ORDERS_DB_BUSY_TIMEOUT_MS
        env::set_var("ORDERS_DB_BUSY_TIMEOUT_MS", "not-a-number");
        let result = DbConfig::from_env();
        env::remove_var("ORDERS_DB_BUSY_TIMEOUT_MS");

        assert_eq!(
            result.unwrap_err(),
            ConfigError::InvalidValue("ORDERS_DB_BUSY_TIMEOUT_MS".to_string())
        );
    }
}
