//! Tenant Guard
//!
//! A data-access guard that keeps tenants of a shared relational store apart.
//! Every tenant-owned table carries a tenant column; the guard binds a store
//! to one tenant and rewrites writes so they can only touch that tenant's rows.
//!
//! # Guarantees
//!
//! - **Inserts** always store the session's tenant in the tenant column,
//!   whatever value the caller supplied.
//! - **Updates and deletes** always carry a tenant predicate. With a caller
//!   condition the predicate is `tenant AND condition`; without one it is the
//!   tenant predicate alone, never "the whole table".
//! - **Reads** are unscoped by default. Callers opt in with
//!   [`SelectBuilder::tenant_scoped`](guard::SelectBuilder::tenant_scoped) or
//!   the explicit [`with_tenant_filter`](facade::TenantSession::with_tenant_filter)
//!   helper, which refuses tables without a tenant column.
//! - **Transactions** carry the same guards as the top-level database.
//!
//! Raw statements ([`TenantSession::query`](facade::TenantSession::query),
//! [`TenantSession::execute`](facade::TenantSession::execute)) and the
//! underlying store ([`TenantSession::raw`](facade::TenantSession::raw)) are
//! never scoped.
//!
//! # Architecture
//!
//! - [`tenant`] - Tenant identifiers and the per-request tenant context
//! - [`registry`] - Which tables are tenant-scoped, and by which column
//! - [`filter`] - Conditions and tenant filter predicates
//! - [`guard`] - The guarded insert, update, delete and select builders
//! - [`facade`] - Tenant-bound database and transaction handles
//! - [`core`] - Store traits and the statements guards dispatch
//! - [`backends`] - Store implementations (SQLite)
//! - [`audit`] - Registry audit against a live schema
//! - [`config`] - Guard and store configuration
//! - [`error`] - Error types for all operations
//!
//! # Quick Start
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
//! store.execute_batch(
//!     "CREATE TABLE customers (id INTEGER PRIMARY KEY, tenant_id TEXT NOT NULL, name TEXT);",
//! )?;
//!
//! let registry = Arc::new(
//!     TableRegistry::builder()
//!         .scoped("customers", "tenant_id")
//!         .build()?,
//! );
//! let factory = TenantDatabaseFactory::new(store, registry, Default::default());
//! let db = factory.create(TenantContext::new(TenantId::new("t1"), "Acme")?);
//!
//! // Stored with tenant_id = "t1", even though the caller said "t2".
//! db.insert("customers")
//!     .values(json!({"id": 1, "name": "Alice", "tenant_id": "t2"}).as_object().cloned())
//!     .execute()
//!     .await?;
//!
//! // Only t1's rows are read.
//! let rows = db
//!     .select("customers")
//!     .filter(db.with_tenant_filter("customers", Some(Condition::eq("id", 1)))?)
//!     .execute()
//!     .await?;
//! assert_eq!(rows.len(), 1);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod audit;
pub mod backends;
pub mod config;
pub mod core;
pub mod error;
pub mod facade;
pub mod filter;
pub mod guard;
pub mod registry;
pub mod tenant;

// Re-export commonly used types at crate root
pub use config::{GuardConfig, TenantGuardConfig, UnregisteredTablePolicy};
pub use error::{StorageError, StorageResult};
pub use facade::{
    TenantDatabase, TenantDatabaseFactory, TenantSession, TenantTransaction, create_tenant_database,
};
pub use filter::{Condition, FilterBuilder, FilterPredicate};
pub use registry::{ColumnRef, TableMetadata, TableRegistry, TableTenancy, TenantTable};
pub use tenant::{TenantContext, TenantContextBuilder, TenantId};

// Re-export core traits
pub use crate::core::{Executor, Row, Statement, Store, StoreTransaction};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
