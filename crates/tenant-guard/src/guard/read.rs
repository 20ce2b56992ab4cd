use crate::core::{Executor, Row, SelectStatement, SortDirection};
use crate::error::StorageResult;
use crate::filter::{Condition, FilterBuilder};
use crate::registry::{ColumnRef, TableMetadata};

use super::GuardScope;

/// Read builder.
///
/// Reads are *not* tenant-scoped unless the caller asks for it, either with
/// [`tenant_scoped`](Self::tenant_scoped) or by passing the result of
/// [`with_tenant_filter`](crate::facade::TenantSession::with_tenant_filter)
/// to [`filter`](Self::filter).
#[must_use = "a select does nothing until `execute` or `first` is awaited"]
pub struct SelectBuilder<'a> {
    executor: &'a dyn Executor,
    scope: GuardScope<'a>,
    statement: SelectStatement,
    tenant_scope: Option<&'a TableMetadata>,
}

impl<'a> SelectBuilder<'a> {
    pub(crate) fn new(executor: &'a dyn Executor, scope: GuardScope<'a>, table: String) -> Self {
        Self {
            executor,
            scope,
            statement: SelectStatement::new(table),
            tenant_scope: None,
        }
    }

    /// Restricts the returned columns.
    pub fn columns<I, C>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<ColumnRef>,
    {
        self.statement.columns.extend(columns.into_iter().map(Into::into));
        self
    }

    /// Adds a condition; repeated calls are ANDed.
    pub fn filter(mut self, condition: impl Into<Condition>) -> Self {
        let condition = condition.into();
        self.statement.filter = Some(match self.statement.filter.take() {
            Some(existing) => existing.and(condition),
            None => condition,
        });
        self
    }

    /// Adds an ordering column.
    pub fn order_by(mut self, column: impl Into<ColumnRef>, direction: SortDirection) -> Self {
        self.statement.order_by.push((column.into(), direction));
        self
    }

    /// Limits the number of rows.
    pub fn limit(mut self, limit: u64) -> Self {
        self.statement.limit = Some(limit);
        self
    }

    /// Skips rows.
    pub fn offset(mut self, offset: u64) -> Self {
        self.statement.offset = Some(offset);
        self
    }

    /// Restricts the read to the session tenant's rows.
    ///
    /// Fails immediately if the table has no tenant column.
    pub fn tenant_scoped(mut self) -> StorageResult<Self> {
        let meta = self.scope.require_scoped(&self.statement.table)?;
        self.tenant_scope = Some(meta);
        Ok(self)
    }

    /// Runs the read.
    pub async fn execute(self) -> StorageResult<Vec<Row>> {
        let Self {
            executor,
            scope,
            mut statement,
            tenant_scope,
        } = self;

        let scoped = tenant_scope.is_some();
        if let Some(meta) = tenant_scope {
            let predicate =
                FilterBuilder::build(scope.tenant.tenant_id(), meta, statement.filter.take())?;
            statement.filter = Some(predicate.into_condition());
        }

        let table = statement.table.clone();
        let rows = executor.select(statement).await?;

        tracing::debug!(
            table = %table,
            tenant_id = %scope.tenant.tenant_id(),
            tenant_scoped = scoped,
            rows = rows.len(),
            "Selected rows"
        );

        Ok(rows)
    }

    /// Runs the read and returns the first row, if any.
    pub async fn first(self) -> StorageResult<Option<Row>> {
        let rows = self.limit(1).execute().await?;
        Ok(rows.into_iter().next())
    }
}
