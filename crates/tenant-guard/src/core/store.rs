//! Store traits.
//!
//! An [`Executor`] runs already-guarded statements. A [`Store`] is an executor
//! that can also begin transactions; a [`StoreTransaction`] is an executor
//! whose statements commit or roll back together.
//!
//! Implementations pass store failures through unchanged (no retries, no
//! generic wrapping) so callers can tell e.g. constraint violations apart.

use async_trait::async_trait;

use crate::error::StorageResult;

use super::statement::{
    DeleteStatement, InsertStatement, MutationOutcome, Row, SelectStatement, Statement,
    UpdateStatement,
};

/// Runs statements against a store or an open transaction.
#[async_trait]
pub trait Executor: Send + Sync {
    /// Returns a short name for the backend (used in logs and errors).
    fn backend_name(&self) -> &'static str;

    /// Reads rows.
    async fn select(&self, statement: SelectStatement) -> StorageResult<Vec<Row>>;

    /// Inserts rows.
    async fn insert(&self, statement: InsertStatement) -> StorageResult<MutationOutcome>;

    /// Updates the rows matching the statement's filter.
    async fn update(&self, statement: UpdateStatement) -> StorageResult<MutationOutcome>;

    /// Deletes the rows matching the statement's filter.
    async fn delete(&self, statement: DeleteStatement) -> StorageResult<MutationOutcome>;

    /// Runs a raw statement that returns rows.
    async fn query(&self, statement: Statement) -> StorageResult<Vec<Row>>;

    /// Runs a raw statement and returns the number of affected rows.
    async fn execute(&self, statement: Statement) -> StorageResult<u64>;
}

/// A store that can begin transactions.
#[async_trait]
pub trait Store: Executor {
    /// The transaction type returned by this store.
    type Transaction: StoreTransaction + 'static;

    /// Begins a new transaction.
    ///
    /// The transaction must be committed or rolled back; implementations roll
    /// back transactions that are dropped while still active.
    async fn begin(&self) -> StorageResult<Self::Transaction>;
}

/// An open transaction.
///
/// Commit and rollback take `&self` so that a transaction can be shared by
/// the closure passed to [`TenantDatabase::transaction`](crate::facade::TenantDatabase)
/// and the code that finishes it.
#[async_trait]
pub trait StoreTransaction: Executor {
    /// Commits the transaction. Fails if it is no longer active.
    async fn commit(&self) -> StorageResult<()>;

    /// Rolls back the transaction. Fails if it is no longer active.
    async fn rollback(&self) -> StorageResult<()>;

    /// Returns whether the transaction is still active.
    fn is_active(&self) -> bool;
}
