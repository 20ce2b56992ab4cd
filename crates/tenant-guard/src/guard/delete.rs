use crate::core::{DeleteStatement, Executor, MutationOutcome, Row};
use crate::error::StorageResult;
use crate::filter::Condition;

use super::mutation::MutationDescriptor;
use super::{GuardScope, Operation};

/// Tenant-scoped delete.
///
/// A delete dispatched without a condition removes only the session tenant's
/// rows.
#[must_use = "a delete does nothing until `execute` or `returning` is awaited"]
pub struct DeleteBuilder<'a> {
    executor: &'a dyn Executor,
    descriptor: MutationDescriptor<'a>,
}

impl<'a> DeleteBuilder<'a> {
    pub(crate) fn new(executor: &'a dyn Executor, scope: GuardScope<'a>, table: String) -> Self {
        Self {
            executor,
            descriptor: MutationDescriptor::new(scope, table, Operation::Delete),
        }
    }

    /// Restricts the delete to rows matching `condition`, within the tenant.
    ///
    /// Calling it again ANDs the new condition with the previous ones.
    pub fn filter(mut self, condition: impl Into<Condition>) -> StorageResult<Self> {
        self.descriptor.attach(condition.into())?;
        Ok(self)
    }

    /// Deletes the rows and returns how many were removed.
    pub async fn execute(self) -> StorageResult<u64> {
        Ok(self.dispatch(false).await?.rows_affected)
    }

    /// Deletes the rows and returns them.
    pub async fn returning(self) -> StorageResult<Vec<Row>> {
        Ok(self.dispatch(true).await?.rows)
    }

    async fn dispatch(self, returning: bool) -> StorageResult<MutationOutcome> {
        let filter = self.descriptor.resolve()?;
        let scope = *self.descriptor.scope();
        let table = self.descriptor.table().to_string();

        let outcome = self
            .executor
            .delete(DeleteStatement {
                table: table.clone(),
                filter,
                returning,
            })
            .await?;

        tracing::debug!(
            table = %table,
            tenant_id = %scope.tenant.tenant_id(),
            condition_supplied = self.descriptor.condition_supplied(),
            rows_affected = outcome.rows_affected,
            "Deleted rows"
        );

        Ok(outcome)
    }
}
