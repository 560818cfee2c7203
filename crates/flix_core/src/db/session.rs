//! Request-scoped sessions and write-scoped units of work.
//!
//! # Responsibility
//! - Own the pool that hands each request its own SQLite connection.
//! - Group the statements of one write into a single transaction.
//!
//! # Invariants
//! - Every pooled connection is configured like `open_db` connections.
//! - Migrations are applied once, before the first session is handed out.
//! - A `UnitOfWork` that is dropped without `commit` rolls back.

use super::migrations::apply_migrations;
use super::open::configure_connection;
use super::DbResult;
use log::{debug, info};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{Connection, Transaction};
use std::ops::Deref;
use std::path::Path;
use std::time::Instant;

const DEFAULT_POOL_SIZE: u32 = 8;

/// One request's connection. Returned to the pool on drop.
pub type Session = PooledConnection<SqliteConnectionManager>;

/// Pool-backed source of request-scoped sessions.
#[derive(Clone)]
pub struct SessionFactory {
    pool: Pool<SqliteConnectionManager>,
}

impl SessionFactory {
    /// Opens a pool over a database file and migrates it.
    pub fn open(path: impl AsRef<Path>) -> DbResult<Self> {
        let manager = SqliteConnectionManager::file(path)
            .with_init(|conn: &mut Connection| configure_connection(conn));
        Self::build(manager, DEFAULT_POOL_SIZE, "file")
    }

    /// Opens a single-connection pool over a private in-memory database.
    ///
    /// SQLite gives every in-memory connection its own database, so the pool
    /// is capped at one connection; a second concurrent `session()` call
    /// waits until the first session is dropped.
    pub fn open_in_memory() -> DbResult<Self> {
        let manager = SqliteConnectionManager::memory()
            .with_init(|conn: &mut Connection| configure_connection(conn));
        Self::build(manager, 1, "memory")
    }

    fn build(
        manager: SqliteConnectionManager,
        max_size: u32,
        mode: &'static str,
    ) -> DbResult<Self> {
        let started_at = Instant::now();
        let pool = Pool::builder().max_size(max_size).build(manager)?;
        {
            let mut conn = pool.get()?;
            apply_migrations(&mut conn)?;
        }
        info!(
            "event=session_factory_open module=db status=ok mode={mode} pool_size={max_size} duration_ms={}",
            started_at.elapsed().as_millis()
        );
        Ok(Self { pool })
    }

    /// Acquires a session for the duration of one request.
    pub fn session(&self) -> DbResult<Session> {
        Ok(self.pool.get()?)
    }
}

/// Transactional scope for one repository write.
pub struct UnitOfWork<'conn> {
    tx: Transaction<'conn>,
    label: &'static str,
    started_at: Instant,
}

impl<'conn> UnitOfWork<'conn> {
    /// Begins a deferred transaction on a shared connection borrow.
    pub fn begin(conn: &'conn Connection, label: &'static str) -> DbResult<Self> {
        let tx = conn.unchecked_transaction()?;
        debug!("event=uow_begin module=db label={label}");
        Ok(Self {
            tx,
            label,
            started_at: Instant::now(),
        })
    }

    /// Commits every statement issued through this unit.
    pub fn commit(self) -> DbResult<()> {
        let label = self.label;
        let started_at = self.started_at;
        self.tx.commit()?;
        debug!(
            "event=uow_commit module=db status=ok label={label} duration_ms={}",
            started_at.elapsed().as_millis()
        );
        Ok(())
    }
}

impl Deref for UnitOfWork<'_> {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        &self.tx
    }
}
