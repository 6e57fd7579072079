//! # Repository Module
//!
//! Repositories over the orders store.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository + Unit of Work                            │
//! │                                                                         │
//! │  Caller                                                                │
//! │       │                                                                 │
//! │       │  let mut repo = db.orders().await?;                             │
//! │       │  repo.update(&order).await?;                                    │
//! │       │  repo.complete();                                               │
//! │       │  repo.close().await?;        ← COMMIT                           │
//! │       ▼                                                                 │
//! │  OrdersRepository / PositionRepository                                 │
//! │       │  (each owns exactly one UnitOfWork)                             │
//! │       ▼                                                                 │
//! │  UnitOfWork ── one SqliteConnection, one transaction                   │
//! │                                                                         │
//! │  Any `?` between open and close drops the repository:                  │
//! │  the connection is released and nothing is committed.                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`OrdersRepository`] - Order + position CRUD
//! - [`PositionRepository`] - Aggregate queries over all positions

pub mod order;
pub mod position;

pub use order::OrdersRepository;
pub use position::{CostPriceStats, PositionRepository};

use crate::error::RepoResult;
use crate::unit_of_work::{UnitOfWork, UnitState};

/// Scoped acquisition shared by every repository.
///
/// Implementors only expose their unit-of-work; completion and closing
/// come from the default methods.
#[allow(async_fn_in_trait)]
pub trait Repository: Sized {
    fn unit(&self) -> &UnitOfWork;

    fn unit_mut(&mut self) -> &mut UnitOfWork;

    fn into_unit(self) -> UnitOfWork;

    /// Marks the work as successful. Idempotent.
    fn complete(&mut self) {
        self.unit_mut().complete();
    }

    fn is_completed(&self) -> bool {
        self.unit().is_completed()
    }

    fn state(&self) -> UnitState {
        self.unit().state()
    }

    /// Commits if completed, otherwise rolls back; always releases the
    /// connection.
    async fn close(self) -> RepoResult<()> {
        self.into_unit().close().await
    }
}
