//! Tenant-bound database handles.
//!
//! A [`TenantSession`] binds a store (or an open transaction) to one tenant and
//! exposes the guarded verbs. [`TenantDatabase`] is a session over a store,
//! [`TenantTransaction`] a session over one of its transactions; both share
//! the same guards, so an operation is scoped the same way whether or not it
//! runs inside a transaction.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use serde_json::json;
//! use tenant_guard::backends::sqlite::SqliteStore;
//! use tenant_guard::facade::TenantDatabaseFactory;
//! use tenant_guard::filter::Condition;
//! use tenant_guard::registry::TableRegistry;
//! use tenant_guard::tenant::{TenantContext, TenantId};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(SqliteStore::in_memory()?);
//! let registry = Arc::new(
//!     TableRegistry::builder()
//!         .scoped("customers", "tenant_id")
//!         .build()?,
//! );
//! let factory = TenantDatabaseFactory::new(store, registry, Default::default());
//!
//! let db = factory.create(TenantContext::new(TenantId::new("t1"), "Acme")?);
//! db.update("customers")
//!     .set_value("name", "Bob")
//!     .filter(Condition::eq("id", 5))?
//!     .execute()
//!     .await?;
//!
//! db.transaction(|tx| async move {
//!     tx.insert("customers")
//!         .values(json!({"id": 6, "name": "Carol"}).as_object().cloned())
//!         .execute()
//!         .await?;
//!     Ok(())
//! })
//! .await?;
//! # Ok(())
//! # }
//! ```

use std::future::Future;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::GuardConfig;
use crate::core::{Executor, Row, Statement, Store, StoreTransaction};
use crate::error::StorageResult;
use crate::filter::{Condition, FilterPredicate};
use crate::guard::{DeleteBuilder, GuardScope, InsertBuilder, SelectBuilder, UpdateBuilder};
use crate::registry::TableRegistry;
use crate::tenant::TenantContext;

/// A store or transaction bound to one tenant.
pub struct TenantSession<E> {
    executor: Arc<E>,
    registry: Arc<TableRegistry>,
    tenant: TenantContext,
    config: Arc<GuardConfig>,
}

/// A session over a store.
pub type TenantDatabase<S> = TenantSession<S>;

/// A session over an open transaction of store `S`.
pub type TenantTransaction<S> = TenantSession<<S as Store>::Transaction>;

impl<E> Clone for TenantSession<E> {
    fn clone(&self) -> Self {
        Self {
            executor: Arc::clone(&self.executor),
            registry: Arc::clone(&self.registry),
            tenant: self.tenant.clone(),
            config: Arc::clone(&self.config),
        }
    }
}

impl<E> std::fmt::Debug for TenantSession<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TenantSession")
            .field("tenant", &self.tenant)
            .field("tables", &self.registry.len())
            .field("config", &self.config)
            .finish()
    }
}

impl<E: Executor> TenantSession<E> {
    fn scope(&self) -> GuardScope<'_> {
        GuardScope {
            registry: &self.registry,
            tenant: &self.tenant,
            config: &self.config,
        }
    }

    fn dyn_executor(&self) -> &dyn Executor {
        self.executor.as_ref()
    }

    /// Returns the tenant this session is bound to.
    pub fn tenant(&self) -> &TenantContext {
        &self.tenant
    }

    /// Returns the table registry.
    pub fn registry(&self) -> &TableRegistry {
        &self.registry
    }

    /// Starts a read. Reads are unscoped unless the caller opts in.
    pub fn select(&self, table: impl Into<String>) -> SelectBuilder<'_> {
        SelectBuilder::new(self.dyn_executor(), self.scope(), table.into())
    }

    /// Starts a tenant-stamping insert.
    pub fn insert(&self, table: impl Into<String>) -> InsertBuilder<'_> {
        InsertBuilder::new(self.dyn_executor(), self.scope(), table.into())
    }

    /// Starts a tenant-scoped update.
    pub fn update(&self, table: impl Into<String>) -> UpdateBuilder<'_> {
        UpdateBuilder::new(self.dyn_executor(), self.scope(), table.into())
    }

    /// Starts a tenant-scoped delete.
    pub fn delete(&self, table: impl Into<String>) -> DeleteBuilder<'_> {
        DeleteBuilder::new(self.dyn_executor(), self.scope(), table.into())
    }

    /// Builds the tenant predicate for a read of `table`, optionally combined
    /// with a caller condition.
    ///
    /// Fails with [`TenantError::NotTenantScoped`](crate::error::TenantError)
    /// if the table is unregistered or has no tenant column, whatever the
    /// guard's policy for mutations.
    pub fn with_tenant_filter(
        &self,
        table: &str,
        condition: Option<Condition>,
    ) -> StorageResult<FilterPredicate> {
        self.scope().tenant_filter(table, condition)
    }

    /// Runs a raw statement that returns rows. Not tenant-scoped.
    pub async fn query(&self, statement: Statement) -> StorageResult<Vec<Row>> {
        debug!(
            tenant_id = %self.tenant.tenant_id(),
            sql = %statement.sql,
            "Running raw query without tenant scoping"
        );
        self.executor.query(statement).await
    }

    /// Runs a raw statement. Not tenant-scoped.
    pub async fn execute(&self, statement: Statement) -> StorageResult<u64> {
        debug!(
            tenant_id = %self.tenant.tenant_id(),
            sql = %statement.sql,
            "Running raw statement without tenant scoping"
        );
        self.executor.execute(statement).await
    }
}

impl<S: Store> TenantSession<S> {
    /// Returns the underlying store. Nothing done through it is tenant-scoped.
    pub fn raw(&self) -> &S {
        &self.executor
    }

    /// Begins a transaction bound to the same tenant.
    ///
    /// The returned session must be committed or rolled back; a transaction
    /// dropped while active is rolled back by the store.
    pub async fn begin(&self) -> StorageResult<TenantTransaction<S>> {
        let tx = self.executor.begin().await?;
        debug!(
            tenant_id = %self.tenant.tenant_id(),
            backend = self.executor.backend_name(),
            "Began tenant transaction"
        );
        Ok(TenantSession {
            executor: Arc::new(tx),
            registry: Arc::clone(&self.registry),
            tenant: self.tenant.clone(),
            config: Arc::clone(&self.config),
        })
    }

    /// Runs `f` inside a transaction.
    ///
    /// Commits when `f` returns `Ok` and rolls back when it returns `Err`. The
    /// error of `f` is returned unchanged; a failing rollback is only logged.
    /// If `f` finishes the transaction itself, nothing more is done.
    pub async fn transaction<F, Fut, R>(&self, f: F) -> StorageResult<R>
    where
        F: FnOnce(TenantTransaction<S>) -> Fut,
        Fut: Future<Output = StorageResult<R>>,
    {
        let tx = self.begin().await?;

        match f(tx.clone()).await {
            Ok(value) => {
                if tx.is_active() {
                    tx.commit().await?;
                }
                Ok(value)
            }
            Err(err) => {
                if tx.is_active() {
                    if let Err(rollback_err) = tx.rollback().await {
                        warn!(
                            tenant_id = %self.tenant.tenant_id(),
                            error = %rollback_err,
                            "Rollback failed after transaction error"
                        );
                    }
                }
                Err(err)
            }
        }
    }
}

impl<T: StoreTransaction> TenantSession<T> {
    /// Commits the transaction.
    pub async fn commit(&self) -> StorageResult<()> {
        self.executor.commit().await?;
        debug!(tenant_id = %self.tenant.tenant_id(), "Committed tenant transaction");
        Ok(())
    }

    /// Rolls back the transaction.
    pub async fn rollback(&self) -> StorageResult<()> {
        self.executor.rollback().await?;
        debug!(tenant_id = %self.tenant.tenant_id(), "Rolled back tenant transaction");
        Ok(())
    }

    /// Returns whether the transaction is still open.
    pub fn is_active(&self) -> bool {
        self.executor.is_active()
    }
}

/// Creates tenant-bound databases that share a store, registry and guard configuration.
pub struct TenantDatabaseFactory<S> {
    store: Arc<S>,
    registry: Arc<TableRegistry>,
    config: Arc<GuardConfig>,
}

impl<S> Clone for TenantDatabaseFactory<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            registry: Arc::clone(&self.registry),
            config: Arc::clone(&self.config),
        }
    }
}

impl<S: Store> TenantDatabaseFactory<S> {
    /// Creates a factory.
    pub fn new(store: Arc<S>, registry: Arc<TableRegistry>, config: GuardConfig) -> Self {
        Self {
            store,
            registry,
            config: Arc::new(config),
        }
    }

    /// Binds the store to a tenant.
    pub fn create(&self, tenant: TenantContext) -> TenantDatabase<S> {
        debug!(
            tenant_id = %tenant.tenant_id(),
            backend = self.store.backend_name(),
            "Created tenant database"
        );
        TenantSession {
            executor: Arc::clone(&self.store),
            registry: Arc::clone(&self.registry),
            tenant,
            config: Arc::clone(&self.config),
        }
    }

    /// Returns the shared store.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Returns the shared registry.
    pub fn registry(&self) -> &Arc<TableRegistry> {
        &self.registry
    }

    /// Returns the guard configuration.
    pub fn config(&self) -> &GuardConfig {
        &self.config
    }
}

/// Binds a store to a tenant with the default guard configuration.
pub fn create_tenant_database<S: Store>(
    store: Arc<S>,
    registry: Arc<TableRegistry>,
    tenant: TenantContext,
) -> TenantDatabase<S> {
    TenantDatabaseFactory::new(store, registry, GuardConfig::default()).create(tenant)
}
