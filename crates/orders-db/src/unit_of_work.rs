//! # Unit of Work
//!
//! One connection, one transaction, one commit-or-rollback decision.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Unit-of-Work State Machine                          │
//! │                                                                         │
//! │  UnitOfWork::open()  ── connect + BEGIN                                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │   ┌────────┐   complete()   ┌───────────┐                              │
//! │   │  Open  │ ─────────────► │ Completed │  (complete() is idempotent)  │
//! │   └───┬────┘                └─────┬─────┘                              │
//! │       │ close(): ROLLBACK          │ close(): COMMIT                    │
//! │       └──────────────┬─────────────┘                                   │
//! │                      ▼                                                  │
//! │                 ┌────────┐                                              │
//! │                 │ Closed │  connection released, value consumed        │
//! │                 └────────┘                                              │
//! │                                                                         │
//! │  Dropped without close(): connection released, SQLite discards the     │
//! │  open transaction.                                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Writes only survive when the caller says so: a unit that is never
//! completed rolls back, whichever way its scope is left.

use sqlx::{ConnectOptions, Connection, SqliteConnection};
use tracing::{debug, warn};

use crate::config::DbConfig;
use crate::error::{RepoResult, RepositoryError, StoreError};

/// Observable state of a live unit-of-work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitState {
    /// Connection live, will roll back on close.
    Open,
    /// Connection live, will commit on close.
    Completed,
}

/// A dedicated connection with an open transaction.
#[derive(Debug)]
pub struct UnitOfWork {
    /// `None` only once `close` has taken it.
    conn: Option<SqliteConnection>,
    completed: bool,
}

impl UnitOfWork {
    /// Opens a new connection and begins a transaction.
    ///
    /// ## Errors
    /// `RepositoryError` wrapping the connect or BEGIN failure.
    pub async fn open(config: &DbConfig) -> RepoResult<Self> {
        debug!(path = %config.database_path.display(), "Opening unit of work");

        let mut conn = config.connect_options().connect().await.map_err(|e| {
            RepositoryError::with_cause(
                "error getting connection",
                StoreError::ConnectionFailed(e.to_string()),
            )
        })?;

        if let Err(e) = sqlx::query("BEGIN").execute(&mut conn).await {
            let cause = StoreError::TransactionFailed(e.to_string());
            let _ = conn.close().await;
            return Err(RepositoryError::with_cause("error beginning transaction", cause));
        }

        Ok(UnitOfWork {
            conn: Some(conn),
            completed: false,
        })
    }

    /// Marks the work as successful: `close` will commit.
    pub fn complete(&mut self) {
        self.completed = true;
    }

    /// Whether `complete` has been called.
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn state(&self) -> UnitState {
        if self.completed {
            UnitState::Completed
        } else {
            UnitState::Open
        }
    }

    /// The connection statements of this unit run on.
    pub fn connection(&mut self) -> RepoResult<&mut SqliteConnection> {
        self.conn
            .as_mut()
            .ok_or_else(|| RepositoryError::new("unit of work is closed"))
    }

    /// Commits if completed, otherwise rolls back, then releases the
    /// connection.
    ///
    /// The connection is closed even when COMMIT or ROLLBACK fails. Every
    /// failure is reported in the returned error.
    pub async fn close(mut self) -> RepoResult<()> {
        let Some(mut conn) = self.conn.take() else {
            return Ok(());
        };

        let statement = if self.completed { "COMMIT" } else { "ROLLBACK" };
        debug!(statement, "Closing unit of work");

        let mut failures = Vec::new();

        if let Err(e) = sqlx::query(statement).execute(&mut conn).await {
            failures.push(StoreError::TransactionFailed(format!("{statement}: {e}")));
        }

        if let Err(e) = conn.close().await {
            failures.push(StoreError::ConnectionFailed(format!("close: {e}")));
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(RepositoryError::with_causes(
                format!("error closing unit of work ({statement})"),
                failures,
            ))
        }
    }
}

impl Drop for UnitOfWork {
    fn drop(&mut self) {
        if self.conn.is_some() {
            warn!(
                completed = self.completed,
                "Unit of work dropped without close; uncommitted changes are discarded"
            );
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
