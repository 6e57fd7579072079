//! Shared fixtures for the unit tests of this crate.

use chrono::NaiveDate;
use sqlx::{ConnectOptions, Connection, SqliteConnection};
use tempfile::TempDir;

use crate::config::DbConfig;
use crate::database::Database;

/// Rows every seeded store starts with: two orders, two positions each.
const SEED: &[&str] = &[
    "INSERT INTO Orders (id, order_date, qty, qtyc) VALUES (1, '2016-01-18', 3000, 30000)",
    "INSERT INTO Position (name, subclass, qty, costprice, position_id) VALUES ('KX888', 't-shirts_l_s', 1500, 10, 1)",
    "INSERT INTO Position (name, subclass, qty, costprice, position_id) VALUES ('KZ999', 'shorts', 1500, 10, 1)",
    "INSERT INTO Orders (id, order_date, qty, qtyc) VALUES (2, '2016-01-18', 2000, 10000)",
    "INSERT INTO Position (name, subclass, qty, costprice, position_id) VALUES ('KY985', 't-shirts_s_s', 1000, 5, 2)",
    "INSERT INTO Position (name, subclass, qty, costprice, position_id) VALUES ('KY988', 't-shirts_s_s', 1000, 5, 2)",
];

/// A database file in a temporary directory, removed on drop.
pub struct TestStore {
    pub dir: TempDir,
    pub config: DbConfig,
}

impl TestStore {
    /// Schema only, no rows.
    pub async fn empty() -> Self {
        let dir = TempDir::new().unwrap();
        let config = DbConfig::new(dir.path().join("orders.db"));
        Database::new(config.clone()).await.unwrap();
        TestStore { dir, config }
    }

    /// Orders 1 and 2 with their positions.
    pub async fn seeded() -> Self {
        let store = TestStore::empty().await;
        store.execute(SEED).await;
        store
    }

    /// Runs raw statements outside any repository and commits them.
    pub async fn execute(&self, statements: &[&str]) {
        let mut conn = connect(&self.config).await;
        for statement in statements {
            sqlx::query(statement).execute(&mut conn).await.unwrap();
        }
        conn.close().await.unwrap();
    }
}

async fn connect(config: &DbConfig) -> SqliteConnection {
    config.connect_options().connect().await.unwrap()
}

async fn count(config: &DbConfig, table: &str) -> i64 {
    let mut conn = connect(config).await;
    let n = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(&mut conn)
        .await
        .unwrap();
    conn.close().await.unwrap();
    n
}

/// Committed order headers, read on a fresh connection.
pub async fn order_count(config: &DbConfig) -> i64 {
    count(config, "Orders").await
}

/// Committed positions, read on a fresh connection.
pub async fn position_count(config: &DbConfig) -> i64 {
    count(config, "Position").await
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}
