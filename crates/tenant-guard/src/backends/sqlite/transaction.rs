//! Transaction support for the SQLite store.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use r2d2::PooledConnection;
use r2d2_sqlite::SqliteConnectionManager;

use crate::core::{
    DeleteStatement, Executor, InsertStatement, MutationOutcome, Row, SelectStatement, Statement,
    StoreTransaction, UpdateStatement,
};
use crate::error::{StorageError, StorageResult, TransactionError};

use super::exec;
use super::store::BACKEND_NAME;

/// A SQLite transaction holding one pooled connection.
pub struct SqliteTransaction {
    conn: Mutex<PooledConnection<SqliteConnectionManager>>,
    active: AtomicBool,
}

impl std::fmt::Debug for SqliteTransaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteTransaction")
            .field("active", &self.is_active())
            .finish()
    }
}

impl SqliteTransaction {
    pub(crate) fn begin(conn: PooledConnection<SqliteConnectionManager>) -> StorageResult<Self> {
        conn.execute("BEGIN IMMEDIATE", []).map_err(|e| {
            StorageError::Transaction(TransactionError::BeginFailed {
                reason: e.to_string(),
            })
        })?;

        Ok(Self {
            conn: Mutex::new(conn),
            active: AtomicBool::new(true),
        })
    }

    fn ensure_active(&self) -> StorageResult<()> {
        if self.is_active() {
            Ok(())
        } else {
            Err(StorageError::Transaction(TransactionError::InvalidTransaction))
        }
    }

    /// Runs COMMIT or ROLLBACK.
    ///
    /// Constraint failures (deferred foreign keys) keep their classification.
    /// On failure the transaction stays active.
    fn finish(&self, sql: &str) -> StorageResult<()> {
        self.ensure_active()?;

        let conn = self.conn.lock();
        conn.execute(sql, []).map_err(|e| {
            let err = StorageError::from(e);
            if err.is_constraint_violation() {
                err
            } else {
                StorageError::Transaction(TransactionError::FinishFailed {
                    statement: sql.to_string(),
                    reason: err.to_string(),
                })
            }
        })?;

        self.active.store(false, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl Executor for SqliteTransaction {
    fn backend_name(&self) -> &'static str {
        BACKEND_NAME
    }

    async fn select(&self, statement: SelectStatement) -> StorageResult<Vec<Row>> {
        self.ensure_active()?;
        let conn = self.conn.lock();
        exec::select(&conn, &statement)
    }

    async fn insert(&self, statement: InsertStatement) -> StorageResult<MutationOutcome> {
        self.ensure_active()?;
        let mut conn = self.conn.lock();
        exec::insert(&mut conn, &statement)
    }

    async fn update(&self, statement: UpdateStatement) -> StorageResult<MutationOutcome> {
        self.ensure_active()?;
        let conn = self.conn.lock();
        exec::update(&conn, &statement)
    }

    async fn delete(&self, statement: DeleteStatement) -> StorageResult<MutationOutcome> {
        self.ensure_active()?;
        let conn = self.conn.lock();
        exec::delete(&conn, &statement)
    }

    async fn query(&self, statement: Statement) -> StorageResult<Vec<Row>> {
        self.ensure_active()?;
        let conn = self.conn.lock();
        exec::query(&conn, &statement)
    }

    async fn execute(&self, statement: Statement) -> StorageResult<u64> {
        self.ensure_active()?;
        let conn = self.conn.lock();
        exec::execute(&conn, &statement)
    }
}

#[async_trait]
impl StoreTransaction for SqliteTransaction {
    async fn commit(&self) -> StorageResult<()> {
        self.finish("COMMIT")
    }

    async fn rollback(&self) -> StorageResult<()> {
        self.finish("ROLLBACK")
    }

    fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}

impl Drop for SqliteTransaction {
    fn drop(&mut self) {
        if self.is_active() {
            tracing::debug!("Rolling back SQLite transaction dropped while active");
            let conn = self.conn.get_mut();
            let _ = conn.execute("ROLLBACK", []);
        }
    }
}
