use serde_json::Value;

use crate::core::{Executor, MutationOutcome, Row, UpdateStatement};
use crate::error::{StorageResult, ValidationError};
use crate::filter::Condition;

use super::mutation::MutationDescriptor;
use super::{GuardScope, Operation, stamp_tenant, touches_column};

/// Tenant-scoped update.
///
/// [`filter`](Self::filter) merges the caller's condition with the tenant
/// predicate. An update dispatched without a condition affects only the
/// session tenant's rows, never the whole table. If the values to set include
/// the tenant column, it is forced to the session's tenant so rows cannot be
/// moved to another tenant.
#[must_use = "an update does nothing until `execute` or `returning` is awaited"]
pub struct UpdateBuilder<'a> {
    executor: &'a dyn Executor,
    descriptor: MutationDescriptor<'a>,
    values: Row,
}

impl<'a> UpdateBuilder<'a> {
    pub(crate) fn new(executor: &'a dyn Executor, scope: GuardScope<'a>, table: String) -> Self {
        Self {
            executor,
            descriptor: MutationDescriptor::new(scope, table, Operation::Update),
            values: Row::new(),
        }
    }

    /// Sets several column values.
    pub fn set(mut self, values: Row) -> Self {
        self.values.extend(values);
        self
    }

    /// Sets one column value.
    pub fn set_value(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(column.into(), value.into());
        self
    }

    /// Restricts the update to rows matching `condition`, within the tenant.
    ///
    /// Calling it again ANDs the new condition with the previous ones. Fails
    /// when the table has no tenant column and the guard rejects such tables.
    pub fn filter(mut self, condition: impl Into<Condition>) -> StorageResult<Self> {
        self.descriptor.attach(condition.into())?;
        Ok(self)
    }

    /// Applies the update and returns how many rows changed.
    pub async fn execute(self) -> StorageResult<u64> {
        Ok(self.dispatch(false).await?.rows_affected)
    }

    /// Applies the update and returns the changed rows.
    pub async fn returning(self) -> StorageResult<Vec<Row>> {
        Ok(self.dispatch(true).await?.rows)
    }

    async fn dispatch(self, returning: bool) -> StorageResult<MutationOutcome> {
        let Self {
            executor,
            descriptor,
            mut values,
        } = self;
        let scope = *descriptor.scope();
        let table = descriptor.table().to_string();

        if values.is_empty() {
            return Err(ValidationError::EmptyUpdate { table }.into());
        }

        let filter = descriptor.resolve()?;

        if let Some(column) = scope.registry.tenant_column(&table) {
            if touches_column(&values, column) {
                stamp_tenant(&mut values, column, &scope, &table);
            }
        }

        let outcome = executor
            .update(UpdateStatement {
                table: table.clone(),
                values,
                filter,
                returning,
            })
            .await?;

        tracing::debug!(
            table = %table,
            tenant_id = %scope.tenant.tenant_id(),
            condition_supplied = descriptor.condition_supplied(),
            rows_affected = outcome.rows_affected,
            "Updated rows"
        );

        Ok(outcome)
    }
}
