//! # Schema Setup
//!
//! One-time, idempotent creation of the two tables the repositories use.
//! There is no versioning: the schema is fixed.
//!
//! ## Tables
//! ```text
//! ┌──────────────────────────────┐        ┌──────────────────────────────┐
//! │ Orders                       │        │ Position                     │
//! │ ──────────────────────────── │        │ ──────────────────────────── │
//! │ id          INTEGER PK       │◄───────│ position_id INTEGER FK       │
//! │ order_date  DATE  (as text)  │        │ name        VARCHAR(5)       │
//! │ qty         NUMERIC          │        │ subclass    VARCHAR(50)      │
//! │ qtyc        NUMERIC          │        │ qty         INTEGER          │
//! └──────────────────────────────┘        │ costprice   NUMERIC          │
//!                                         │ PK (name, position_id)       │
//!                                         └──────────────────────────────┘
//! ```

use sqlx::SqliteConnection;
use tracing::info;

use crate::error::{RepoResult, ResultExt};

const CREATE_ORDERS: &str = r#"
    CREATE TABLE IF NOT EXISTS Orders (
        id INTEGER PRIMARY KEY,
        order_date DATE NOT NULL,
        qty NUMERIC NOT NULL,
        qtyc NUMERIC NOT NULL
    )
"#;

const CREATE_POSITION: &str = r#"
    CREATE TABLE IF NOT EXISTS Position (
        name VARCHAR(5),
        subclass VARCHAR(50),
        qty INTEGER NOT NULL,
        costprice NUMERIC NOT NULL,
        position_id INTEGER,
        FOREIGN KEY(position_id) REFERENCES Orders(id),
        PRIMARY KEY (name, position_id)
    )
"#;

/// Creates the `Orders` and `Position` tables if they don't exist.
///
/// Safe to run multiple times.
pub async fn ensure_schema(conn: &mut SqliteConnection) -> RepoResult<()> {
    info!("Ensuring orders schema");

    for statement in [CREATE_ORDERS, CREATE_POSITION] {
        sqlx::query(statement)
            .execute(&mut *conn)
            .await
            .context(|| "error creating schema".to_string())?;
    }

    Ok(())
}

/// Drops both tables and creates them again, discarding all data.
pub async fn reset(conn: &mut SqliteConnection) -> RepoResult<()> {
    info!("Resetting orders schema");

    for statement in ["DROP TABLE IF EXISTS Position", "DROP TABLE IF EXISTS Orders"] {
        sqlx::query(statement)
            .execute(&mut *conn)
            .await
            .context(|| "error dropping schema".to_string())?;
    }

    ensure_schema(conn).await
}

/// Number of the two store tables present (0, 1 or 2).
///
/// For diagnostics and health checks.
pub async fn tables_present(conn: &mut SqliteConnection) -> RepoResult<i64> {
    sqlx::query_scalar(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN ('Orders', 'Position')",
    )
    .fetch_one(&mut *conn)
    .await
    .context(|| "error inspecting schema".to_string())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use sqlx::{ConnectOptions, Connection};
    use tempfile::TempDir;

    use super::*;
    use crate::config::DbConfig;

    async fn connect(dir: &TempDir) -> SqliteConnection {
        DbConfig::new(dir.path().join("schema.db"))
            .connect_options()
            .connect()
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_ensure_schema_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let mut conn = connect(&dir).await;

        assert_eq!(tables_present(&mut conn).await.unwrap(), 0);
        ensure_schema(&mut conn).await.unwrap();
        ensure_schema(&mut conn).await.unwrap();
        assert_eq!(tables_present(&mut conn).await.unwrap(), 2);

        conn.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_reset_discards_rows() {
        let dir = TempDir::new().unwrap();
        let mut conn = connect(&dir).await;
        ensure_schema(&mut conn).await.unwrap();

        sqlx::query("INSERT INTO Orders (id, order_date, qty, qtyc) VALUES (1, '2016-01-18', 0, 0)")
            .execute(&mut conn)
            .await
            .unwrap();

        reset(&mut conn).await.unwrap();

        let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM Orders")
            .fetch_one(&mut conn)
            .await
            .unwrap();
        assert_eq!(rows, 0);
        assert_eq!(tables_present(&mut conn).await.unwrap(), 2);

        conn.close().await.unwrap();
    }
}
