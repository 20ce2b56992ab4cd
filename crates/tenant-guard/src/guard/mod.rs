//! Tenant guards.
//!
//! Guards wrap the primitive verbs of a store so that every call is scoped to
//! the session's tenant:
//!
//! - [`InsertBuilder`] overwrites the tenant column of every row.
//! - [`UpdateBuilder`] and [`DeleteBuilder`] merge the tenant predicate into
//!   the caller's condition, or synthesize it when no condition was attached.
//! - [`SelectBuilder`] is *not* scoped automatically; callers opt in through
//!   [`SelectBuilder::tenant_scoped`] or the explicit
//!   [`with_tenant_filter`](crate::facade::TenantSession::with_tenant_filter) helper.
//!
//! Tables without a tenant column are handled asymmetrically. Mutation guards
//! follow [`UnregisteredTablePolicy`] (pass-through with a warning by default),
//! while the explicit read helper always fails, because a caller that asked
//! for tenant scoping must never silently go without it.

mod delete;
mod insert;
mod mutation;
mod read;
mod update;

use std::fmt;

use serde_json::Value;

use crate::config::{GuardConfig, UnregisteredTablePolicy};
use crate::core::Row;
use crate::error::{StorageResult, TenantError};
use crate::filter::{Condition, FilterBuilder, FilterPredicate};
use crate::registry::{ColumnRef, TableMetadata, TableRegistry};
use crate::tenant::TenantContext;

pub use delete::DeleteBuilder;
pub use insert::InsertBuilder;
pub use read::SelectBuilder;
pub use update::UpdateBuilder;

/// The guarded verbs, used in log fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Operation {
    Insert,
    Update,
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Insert => write!(f, "insert"),
            Operation::Update => write!(f, "update"),
            Operation::Delete => write!(f, "delete"),
        }
    }
}

/// Everything a guard needs to scope an operation.
#[derive(Debug, Clone, Copy)]
pub(crate) struct GuardScope<'a> {
    pub(crate) registry: &'a TableRegistry,
    pub(crate) tenant: &'a TenantContext,
    pub(crate) config: &'a GuardConfig,
}

impl<'a> GuardScope<'a> {
    /// Resolves the metadata of a scoped table for a mutation.
    ///
    /// Returns `Ok(None)` for tables without a tenant column when the policy
    /// allows pass-through.
    pub(crate) fn mutation_metadata(
        &self,
        table: &str,
        operation: Operation,
    ) -> StorageResult<Option<&'a TableMetadata>> {
        let registry: &'a TableRegistry = self.registry;
        match registry.lookup(table) {
            Some(meta) if meta.tenant_column().is_some() => Ok(Some(meta)),
            _ => match self.config.unregistered_tables {
                UnregisteredTablePolicy::PassThrough => Ok(None),
                UnregisteredTablePolicy::Reject => {
                    tracing::error!(
                        table,
                        tenant_id = %self.tenant.tenant_id(),
                        operation = %operation,
                        "Refusing mutation on table without tenant column"
                    );
                    Err(self.not_scoped(table).into())
                }
            },
        }
    }

    /// Resolves the metadata of a scoped table for an explicit tenant filter.
    ///
    /// Fails for unregistered and unscoped tables regardless of policy.
    pub(crate) fn require_scoped(&self, table: &str) -> StorageResult<&'a TableMetadata> {
        let registry: &'a TableRegistry = self.registry;
        match registry.lookup(table) {
            Some(meta) if meta.tenant_column().is_some() => Ok(meta),
            _ => {
                tracing::error!(
                    table,
                    tenant_id = %self.tenant.tenant_id(),
                    "Tenant filter requested for table without tenant column"
                );
                Err(self.not_scoped(table).into())
            }
        }
    }

    /// Builds the tenant predicate for an explicit read.
    pub(crate) fn tenant_filter(
        &self,
        table: &str,
        condition: Option<Condition>,
    ) -> StorageResult<FilterPredicate> {
        let meta = self.require_scoped(table)?;
        Ok(FilterBuilder::build(self.tenant.tenant_id(), meta, condition)?)
    }

    /// Logs a mutation dispatched without a tenant predicate.
    pub(crate) fn warn_unscoped(&self, table: &str, operation: Operation) {
        tracing::warn!(
            table,
            tenant_id = %self.tenant.tenant_id(),
            operation = %operation,
            "Table is not tenant-scoped; dispatching without tenant predicate"
        );
    }

    fn not_scoped(&self, table: &str) -> TenantError {
        TenantError::NotTenantScoped {
            table: table.to_string(),
            tenant_id: self.tenant.tenant_id().clone(),
        }
    }
}

/// Overwrites the tenant column of a row with the session's tenant.
///
/// A different value supplied by the caller is replaced, never kept. Keys that
/// name the tenant column in another ASCII case are removed as well, since the
/// store would write them to the same column.
pub(crate) fn stamp_tenant(row: &mut Row, column: &ColumnRef, scope: &GuardScope<'_>, table: &str) {
    let tenant_value = Value::String(scope.tenant.tenant_id().as_str().to_string());

    let supplied_keys: Vec<String> = row.keys().filter(|k| column.matches(k)).cloned().collect();
    for key in supplied_keys {
        if let Some(previous) = row.remove(&key) {
            if previous != tenant_value {
                tracing::warn!(
                    table,
                    column = %key,
                    tenant_id = %scope.tenant.tenant_id(),
                    supplied = %previous,
                    "Overwrote caller-supplied tenant column"
                );
            }
        }
    }

    row.insert(column.as_str().to_string(), tenant_value);
}

/// Returns `true` if the row sets the tenant column, in any ASCII case.
pub(crate) fn touches_column(row: &Row, column: &ColumnRef) -> bool {
    row.keys().any(|k| column.matches(k))
}
