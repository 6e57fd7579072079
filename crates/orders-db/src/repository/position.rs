//! # Position Repository
//!
//! Read-only aggregates over every position of every order. No filter by
//! order, date or subclass.

use serde::Serialize;
use tracing::debug;

use crate::config::DbConfig;
use crate::error::{RepoResult, ResultExt};
use crate::repository::Repository;
use crate::unit_of_work::UnitOfWork;
use orders_core::stats::{mean, min_max, round_to};

/// Cost price spread across all positions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CostPriceStats {
    pub min: f64,
    /// Rounded to 2 decimals.
    pub mean: f64,
    pub max: f64,
}

/// Repository for position aggregates.
#[derive(Debug)]
pub struct PositionRepository {
    unit: UnitOfWork,
}

impl Repository for PositionRepository {
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

impl PositionRepository {
    /// Opens a repository on its own connection and transaction.
    pub async fn open(config: &DbConfig) -> RepoResult<Self> {
        Ok(PositionRepository::from_unit(UnitOfWork::open(config).await?))
    }

    /// Wraps an already open unit-of-work.
    pub fn from_unit(unit: UnitOfWork) -> Self {
        PositionRepository { unit }
    }

    /// Mean quantity over all positions.
    ///
    /// `None` when there are no positions.
    pub async fn mean_quantity(&mut self) -> RepoResult<Option<f64>> {
        let conn = self.unit.connection()?;

        let quantities: Vec<i64> = sqlx::query_scalar("SELECT qty FROM Position")
            .fetch_all(&mut *conn)
            .await
            .context(|| "error computing mean quantity of positions".to_string())?;

        debug!(rows = quantities.len(), "Computing mean quantity");

        let quantities: Vec<f64> = quantities.into_iter().map(|q| q as f64).collect();
        Ok(mean(&quantities))
    }

    /// Min, mean and max cost price over all positions, each rounded to
    /// 2 decimals.
    ///
    /// `None` when there are no positions.
    pub async fn min_mean_max_cost_price(&mut self) -> RepoResult<Option<CostPriceStats>> {
        let conn = self.unit.connection()?;

        let prices: Vec<f64> = sqlx::query_scalar("SELECT CAST(costprice AS REAL) FROM Position")
            .fetch_all(&mut *conn)
            .await
            .context(|| "error computing min/mean/max cost price of positions".to_string())?;

        debug!(rows = prices.len(), "Computing cost price spread");

        let (Some((min, max)), Some(avg)) = (min_max(&prices), mean(&prices)) else {
            return Ok(None);
        };

        Ok(Some(CostPriceStats {
            min: round_to(min, 2),
            mean: round_to(avg, 2),
            max: round_to(max, 2),
        }))
    }

    /// Number of positions across all orders.
    pub async fn count(&mut self) -> RepoResult<i64> {
        let conn = self.unit.connection()?;

        sqlx::query_scalar("SELECT COUNT(*) FROM Position")
            .fetch_one(&mut *conn)
            .await
            .context(|| "error counting positions".to_string())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::TestStore;

    #[tokio::test]
    async fn test_mean_quantity() {
        let store = TestStore::seeded().await;
        let mut repo = PositionRepository::open(&store.config).await.unwrap();

        assert_eq!(repo.mean_quantity().await.unwrap(), Some(1250.0));
        assert_eq!(repo.count().await.unwrap(), 4);

        repo.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_mean_quantity_empty() {
        let store = TestStore::empty().await;
        let mut repo = PositionRepository::open(&store.config).await.unwrap();

        assert_eq!(repo.mean_quantity().await.unwrap(), None);
        assert_eq!(repo.count().await.unwrap(), 0);

        repo.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_min_mean_max_cost_price() {
        let store = TestStore::seeded().await;
        let mut repo = PositionRepository::open(&store.config).await.unwrap();

        assert_eq!(
            repo.min_mean_max_cost_price().await.unwrap(),
            Some(CostPriceStats {
                min: 5.0,
                mean: 7.5,
                max: 10.0,
            })
        );

        repo.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_min_mean_max_cost_price_empty() {
        let store = TestStore::empty().await;
        let mut repo = PositionRepository::open(&store.config).await.unwrap();

        assert_eq!(repo.min_mean_max_cost_price().await.unwrap(), None);

        repo.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_mean_cost_price_is_rounded() {
        let store = TestStore::empty().await;
        store
            .execute(&[
                "INSERT INTO Orders (id, order_date, qty, qtyc) VALUES (1, '2016-01-19', 3, 31.3)",
                "INSERT INTO Position (name, subclass, qty, costprice, position_id) VALUES ('A', 'x', 1, 5.5, 1)",
                "INSERT INTO Position (name, subclass, qty, costprice, position_id) VALUES ('B', 'x', 1, 10.2, 1)",
                "INSERT INTO Position (name, subclass, qty, costprice, position_id) VALUES ('C', 'x', 1, 15.6, 1)",
            ])
            .await;

        let mut repo = PositionRepository::open(&store.config).await.unwrap();
        let stats = repo.min_mean_max_cost_price().await.unwrap().unwrap();
        repo.close().await.unwrap();

        // (5.5 + 10.2 + 15.6) / 3 = 10.4333...
        assert_eq!(stats.mean, 10.43);
        assert_eq!(stats.min, 5.5);
        assert_eq!(stats.max, 15.6);
    }
}
