//! # Database Handle
//!
//! Entry point that knows where the store lives and hands out repositories.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Database Handle                                    │
//! │                                                                         │
//! │  DbConfig::new(path) ← Configure connection settings                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Database::new(config).await ← Ensure schema (if enabled)              │
//! │       │                                                                 │
//! │       ├── db.orders().await?     ──► OrdersRepository   (Conn A, Tx A) │
//! │       └── db.positions().await?  ──► PositionRepository (Conn B, Tx B) │
//! │                                                                         │
//! │  No pool: every repository opens, owns and closes its own connection.  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::{ConnectOptions, Connection};
use tracing::info;

use crate::config::DbConfig;
use crate::error::{RepoResult, RepositoryError, StoreError};
use crate::repository::{OrdersRepository, PositionRepository};
use crate::schema;

/// Main database handle providing repository access.
///
/// Cheap to clone: it only holds the configuration.
#[derive(Debug, Clone)]
pub struct Database {
    config: DbConfig,
}

impl Database {
    /// Creates the handle.
    ///
    /// ## What This Does
    /// 1. Creates the database file if it doesn't exist (and the config allows)
    /// 2. Creates the `Orders` / `Position` tables (if `ensure_schema` is set)
    ///
    /// ## Example
    /// ```rust,ignore
    /// let db = Database::new(DbConfig::new("./orders.db")).await?;
    /// ```
    pub async fn new(config: DbConfig) -> RepoResult<Self> {
        info!(
            path = %config.database_path.display(),
            "Initializing orders database"
        );

        let db = Database { config };

        if db.config.ensure_schema {
            db.ensure_schema().await?;
        }

        Ok(db)
    }

    pub fn config(&self) -> &DbConfig {
        &self.config
    }

    /// Creates missing tables on a short-lived connection.
    pub async fn ensure_schema(&self) -> RepoResult<()> {
        self.with_connection(|conn| Box::pin(schema::ensure_schema(conn)))
            .await
    }

    /// Drops and recreates both tables, discarding all data.
    pub async fn reset_schema(&self) -> RepoResult<()> {
        self.with_connection(|conn| Box::pin(schema::reset(conn))).await
    }

    /// Opens an orders repository on a new unit-of-work.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let mut repo = db.orders().await?;
    /// repo.add(&order).await?;
    /// repo.complete();
    /// repo.close().await?;
    /// ```
    pub async fn orders(&self) -> RepoResult<OrdersRepository> {
        OrdersRepository::open(&self.config).await
    }

    /// Opens a position repository on a new unit-of-work.
    pub async fn positions(&self) -> RepoResult<PositionRepository> {
        PositionRepository::open(&self.config).await
    }

    /// Checks if the database is reachable and both tables exist.
    pub async fn health_check(&self) -> bool {
        let tables = self
            .with_connection(|conn| Box::pin(schema::tables_present(conn)))
            .await;

        matches!(tables, Ok(2))
    }

    /// Runs `f` on a dedicated autocommit connection, then closes it.
    async fn with_connection<T, F>(&self, f: F) -> RepoResult<T>
    where
        F: for<'c> FnOnce(
            &'c mut sqlx::SqliteConnection,
        ) -> std::pin::Pin<Box<dyn std::future::Future<Output = RepoResult<T>> + Send + 'c>>,
    {
        let mut conn = self.config.connect_options().connect().await.map_err(|e| {
            RepositoryError::with_cause(
                "error getting connection",
                StoreError::ConnectionFailed(e.to_string()),
            )
        })?;

        let result = f(&mut conn).await;
        let closed = conn.close().await;

        match (result, closed) {
            (result, Ok(())) => result,
            (Ok(_), Err(e)) => Err(RepositoryError::with_cause(
                "error closing connection",
                StoreError::ConnectionFailed(e.to_string()),
            )),
            (Err(failed), Err(e)) => Err(merge_close_failure(failed, e)),
        }
    }
}

/// Appends a failed connection close to the error of the work that ran on it.
fn merge_close_failure(failed: RepositoryError, close: sqlx::Error) -> RepositoryError {
    let message = format!("{}; error closing connection", failed.message());
    let mut causes: Vec<StoreError> = failed.into_causes();
    causes.push(StoreError::ConnectionFailed(close.to_string()));
    RepositoryError::with_causes(message, causes)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::repository::Repository;
    use crate::test_support::TestStore;
    use orders_core::{Order, Position};

    #[tokio::test]
    async fn test_new_creates_schema() {
        let store = TestStore::empty().await;
        let db = Database::new(store.config.clone()).await.unwrap();
        assert!(db.health_check().await);
    }

    #[tokio::test]
    async fn test_health_check_without_schema() {
        let dir = TempDir::new().unwrap();
        let config = DbConfig::new(dir.path().join("bare.db")).ensure_schema(false);
        let db = Database::new(config).await.unwrap();

        assert!(!db.health_check().await);
        db.ensure_schema().await.unwrap();
        assert!(db.health_check().await);
    }

    #[test]
    fn test_close_failure_keeps_work_failure() {
        let failed = RepositoryError::with_cause(
            "error resetting schema",
            StoreError::QueryFailed("database is locked".to_string()),
        );

        let err = merge_close_failure(failed, sqlx::Error::PoolClosed);
        assert_eq!(err.message(), "error resetting schema; error closing connection");

        let causes: Vec<&StoreError> = err.causes().collect();
        assert_eq!(causes.len(), 2);
        assert!(matches!(causes[0], StoreError::QueryFailed(_)));
        assert!(matches!(causes[1], StoreError::ConnectionFailed(_)));
    }

    #[tokio::test]
    async fn test_repositories_round_trip() {
        let store = TestStore::empty().await;
        let db = Database::new(store.config.clone()).await.unwrap();

        let mut orders = db.orders().await.unwrap();
        orders
            .add(&Order::new(1).with_positions(vec![Position::new("KX977", "t-shirts_s_s", 1000, 5.5)]))
            .await
            .unwrap();
        orders.complete();
        orders.close().await.unwrap();

        let mut positions = db.positions().await.unwrap();
        assert_eq!(positions.mean_quantity().await.unwrap(), Some(1000.0));
        positions.close().await.unwrap();

        db.reset_schema().await.unwrap();

        let mut positions = db.positions().await.unwrap();
        assert_eq!(positions.count().await.unwrap(), 0);
        positions.close().await.unwrap();
    }
}
