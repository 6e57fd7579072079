//! # Orders Repository
//!
//! Order header + positions, persisted and removed together.
//!
//! ## Update Is Replace
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        update(order)                                    │
//! │                                                                         │
//! │  1. get_by_id(order.id)                                                │
//! │       │                                                                 │
//! │       ├── Some(_) ──► delete(order)   (positions, then header)         │
//! │       └── None    ──► (nothing to remove)                              │
//! │       │                                                                 │
//! │  2. add(order)                         (header, then every position)   │
//! │                                                                         │
//! │  Positions missing from `order` are gone afterwards. The sequence is   │
//! │  only as atomic as the surrounding unit-of-work: nothing guards        │
//! │  against another unit-of-work writing the same id in between.          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;
use sqlx::SqliteConnection;
use tracing::{debug, warn};

use crate::config::DbConfig;
use crate::error::{RepoResult, RepositoryError, ResultExt};
use crate::repository::Repository;
use crate::unit_of_work::UnitOfWork;
use orders_core::validation::validate_order;
use orders_core::{Order, Position};

/// Stored order header.
#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: i64,
    order_date: NaiveDate,
    qty: i64,
    qtyc: f64,
}

/// Repository for order operations.
#[derive(Debug)]
pub struct OrdersRepository {
    unit: UnitOfWork,
}

impl Repository for OrdersRepository {
    fn unit(&self) -> &UnitOfWork {
        &self.unit
    }

    fn unit_mut(&mut self) -> &mut UnitOfWork {
        &mut self.unit
    }

    fn into_unit(self) -> UnitOfWork {
        self.unit
    }
}

impl OrdersRepository {
    /// Opens a repository on its own connection and transaction.
    pub async fn open(config: &DbConfig) -> RepoResult<Self> {
        Ok(OrdersRepository::from_unit(UnitOfWork::open(config).await?))
    }

    /// Wraps an already open unit-of-work.
    pub fn from_unit(unit: UnitOfWork) -> Self {
        OrdersRepository { unit }
    }

    /// Inserts an order header and all of its positions.
    ///
    /// The stored `qty` / `qtyc` are recomputed from the positions. Nothing
    /// is rolled back here: if a position fails, the rows written so far
    /// stay in the transaction until the unit-of-work closes uncompleted.
    ///
    /// ## Errors
    /// - The order fails validation (no statement runs)
    /// - The id already exists
    /// - Any position insert fails; the message names that position
    pub async fn add(&mut self, order: &Order) -> RepoResult<()> {
        debug!(id = order.id(), positions = order.positions().len(), "Adding order");

        validate_order(order).context(|| format!("error adding order {order}"))?;

        let conn = self.unit.connection()?;

        insert_header(conn, order)
            .await
            .context(|| format!("error adding order {order}"))?;

        for position in order.positions() {
            insert_position(conn, order.id(), position)
                .await
                .context(|| format!("error adding order {order}: failed on position {position}"))?;
        }

        Ok(())
    }

    /// Deletes an order's positions, then its header.
    ///
    /// A nonexistent id is not an error.
    pub async fn delete(&mut self, order: &Order) -> RepoResult<()> {
        self.delete_by_id(order.id())
            .await
            .map_err(|e| RepositoryError::context(e, format!("error deleting order {order}")))
    }

    /// Same as [`OrdersRepository::delete`], keyed by id only.
    pub async fn delete_by_id(&mut self, id: i64) -> RepoResult<()> {
        debug!(id, "Deleting order");

        let conn = self.unit.connection()?;

        let positions = sqlx::query("DELETE FROM Position WHERE position_id = ?1")
            .bind(id)
            .execute(&mut *conn)
            .await
            .context(|| format!("error deleting positions of order {id}"))?;

        let headers = sqlx::query("DELETE FROM Orders WHERE id = ?1")
            .bind(id)
            .execute(&mut *conn)
            .await
            .context(|| format!("error deleting order {id}"))?;

        debug!(
            id,
            positions = positions.rows_affected(),
            headers = headers.rows_affected(),
            "Order deleted"
        );

        Ok(())
    }

    /// Gets an order by id, with positions ordered by name.
    ///
    /// Stored dates may carry a time part (`2016-01-19 10:11:12.123456`);
    /// only the calendar date is read.
    ///
    /// ## Returns
    /// * `Ok(None)` - No header with that id
    /// * `Ok(Some(order))` - Stored date, qty and qtyc, plus positions
    pub async fn get_by_id(&mut self, id: i64) -> RepoResult<Option<Order>> {
        let context = || format!("error getting order by id {id}");
        let conn = self.unit.connection()?;

        let header: Option<OrderRow> = sqlx::query_as(
            r#"
            SELECT
                id,
                date(order_date) AS order_date,
                CAST(qty AS INTEGER) AS qty,
                CAST(qtyc AS REAL) AS qtyc
            FROM Orders
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
        .context(context)?;

        let Some(header) = header else {
            return Ok(None);
        };

        let positions: Vec<Position> = sqlx::query_as(
            r#"
            SELECT
                name,
                COALESCE(subclass, '') AS subclass,
                qty,
                CAST(costprice AS REAL) AS costprice
            FROM Position
            WHERE position_id = ?1
            ORDER BY name
            "#,
        )
        .bind(id)
        .fetch_all(&mut *conn)
        .await
        .context(context)?;

        let order = Order::restore(header.id, header.order_date, header.qty, header.qtyc, positions);
        if !order.totals_consistent() {
            warn!(id, qty = order.qty(), qtyc = order.qtyc(), "Stored order totals differ from its positions");
        }

        Ok(Some(order))
    }

    /// Whether an order header with this id exists.
    pub async fn exists(&mut self, id: i64) -> RepoResult<bool> {
        let conn = self.unit.connection()?;

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM Orders WHERE id = ?1")
            .bind(id)
            .fetch_one(&mut *conn)
            .await
            .context(|| format!("error checking order {id}"))?;

        Ok(count > 0)
    }

    /// Replaces a stored order with `order`, or adds it if absent.
    pub async fn update(&mut self, order: &Order) -> RepoResult<()> {
        debug!(id = order.id(), "Updating order");

        let outer = || format!("error updating order {order}");

        if self.get_by_id(order.id()).await.map_err(|e| e.context(outer()))?.is_some() {
            self.delete(order).await.map_err(|e| e.context(outer()))?;
        }

        self.add(order).await.map_err(|e| e.context(outer()))
    }
}

async fn insert_header(conn: &mut SqliteConnection, order: &Order) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO Orders (id, order_date, qty, qtyc) VALUES (?1, ?2, ?3, ?4)")
        .bind(order.id())
        .bind(order.date())
        .bind(order.qty())
        .bind(order.qtyc())
        .execute(&mut *conn)
        .await?;

    Ok(())
}

async fn insert_position(
    conn: &mut SqliteConnection,
    order_id: i64,
    position: &Position,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO Position (name, subclass, qty, costprice, position_id)
        VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
    )
    .bind(&position.name)
    .bind(&position.subclass)
    .bind(position.qty)
    .bind(position.costprice)
    .bind(order_id)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
