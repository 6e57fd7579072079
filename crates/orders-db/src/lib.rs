//! # orders-db: Database Layer for the Orders Store
//!
//! Persists orders and their positions in SQLite, one transaction per
//! unit-of-work.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Orders Store Data Flow                           │
//! │                                                                         │
//! │  Caller (orders-demo, application code)                                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   orders-db (THIS CRATE)                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │    Schema    │  │   │
//! │  │   │ (database.rs) │    │  (order.rs,   │    │ (schema.rs)  │  │   │
//! │  │   │               │    │  position.rs) │    │              │  │   │
//! │  │   │ DbConfig      │───►│ OrdersRepo    │    │ Orders       │  │   │
//! │  │   │ health check  │    │ PositionRepo  │    │ Position     │  │   │
//! │  │   └───────────────┘    └───────┬───────┘    └──────────────┘  │   │
//! │  │                                │                                │   │
//! │  │                        ┌───────▼───────┐                        │   │
//! │  │                        │  UnitOfWork   │ 1 connection, 1 tx     │   │
//! │  │                        └───────────────┘                        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database file (orders.db)                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`config`] - Database location and connection settings
//! - [`database`] - Handle that hands out repositories
//! - [`unit_of_work`] - Connection + transaction with commit/rollback on close
//! - [`repository`] - Orders and position repositories
//! - [`schema`] - Idempotent table creation
//! - [`error`] - Repository error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use orders_db::{Database, DbConfig, Repository};
//!
//! let db = Database::new(DbConfig::new("orders.db")).await?;
//!
//! let mut repo = db.orders().await?;
//! repo.update(&order).await?;
//! repo.complete();
//! repo.close().await?; // COMMIT
//!
//! let mut stats = db.positions().await?;
//! let mean = stats.mean_quantity().await?;
//! stats.close().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod database;
pub mod error;
pub mod repository;
pub mod schema;
pub mod unit_of_work;

#[cfg(test)]
mod test_support;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{ConfigError, DbConfig};
pub use database::Database;
pub use error::{RepoResult, RepositoryError, StoreError};
pub use unit_of_work::{UnitOfWork, UnitState};

// Repository re-exports for convenience
pub use repository::{CostPriceStats, OrdersRepository, PositionRepository, Repository};
