use serde::Serialize;
use serde_json::Value;

use crate::core::{Executor, InsertStatement, MutationOutcome, Row};
use crate::error::{StorageResult, ValidationError};

use super::{GuardScope, Operation, stamp_tenant};

/// Tenant-stamping insert.
///
/// Every row gets the session's tenant in the table's tenant column before it
/// reaches the store, overwriting whatever the caller supplied.
///
/// ```no_run
/// # use tenant_guard::facade::TenantDatabase;
/// # use tenant_guard::backends::sqlite::SqliteStore;
/// # async fn example(db: TenantDatabase<SqliteStore>) -> tenant_guard::error::StorageResult<()> {
/// let row = serde_json::json!({"id": 1, "name": "Alice"});
/// db.insert("customers")
///     .values(row.as_object().cloned())
///     .execute()
///     .await?;
/// # Ok(())
/// # }
/// ```
#[must_use = "an insert does nothing until `execute` or `returning` is awaited"]
pub struct InsertBuilder<'a> {
    executor: &'a dyn Executor,
    scope: GuardScope<'a>,
    table: String,
    rows: Vec<Row>,
}

impl<'a> InsertBuilder<'a> {
    pub(crate) fn new(executor: &'a dyn Executor, scope: GuardScope<'a>, table: String) -> Self {
        Self {
            executor,
            scope,
            table,
            rows: Vec::new(),
        }
    }

    /// Adds rows to write.
    pub fn values<I>(mut self, rows: I) -> Self
    where
        I: IntoIterator<Item = Row>,
    {
        self.rows.extend(rows);
        self
    }

    /// Adds a serializable record as a row.
    ///
    /// Fails if the record does not serialize to a JSON object.
    pub fn record<T: Serialize>(mut self, record: &T) -> StorageResult<Self> {
        let row = self.to_row(record)?;
        self.rows.push(row);
        Ok(self)
    }

    /// Adds several serializable records as rows.
    pub fn records<T: Serialize>(mut self, records: &[T]) -> StorageResult<Self> {
        for record in records {
            let row = self.to_row(record)?;
            self.rows.push(row);
        }
        Ok(self)
    }

    /// Writes the rows and returns how many were inserted.
    pub async fn execute(self) -> StorageResult<u64> {
        Ok(self.dispatch(false).await?.rows_affected)
    }

    /// Writes the rows and returns them as stored.
    pub async fn returning(self) -> StorageResult<Vec<Row>> {
        Ok(self.dispatch(true).await?.rows)
    }

    fn to_row<T: Serialize>(&self, record: &T) -> StorageResult<Row> {
        match serde_json::to_value(record)? {
            Value::Object(row) => Ok(row),
            other => Err(ValidationError::InvalidRecord {
                table: self.table.clone(),
                message: format!("expected object, got {}", other),
            }
            .into()),
        }
    }

    async fn dispatch(self, returning: bool) -> StorageResult<MutationOutcome> {
        let Self {
            executor,
            scope,
            table,
            mut rows,
        } = self;

        if rows.is_empty() {
            return Err(ValidationError::EmptyInsert { table }.into());
        }

        match scope.mutation_metadata(&table, Operation::Insert)? {
            Some(meta) => {
                if let Some(column) = meta.tenant_column() {
                    for row in rows.iter_mut() {
                        stamp_tenant(row, column, &scope, &table);
                    }
                }
            }
            None => scope.warn_unscoped(&table, Operation::Insert),
        }

        let row_count = rows.len();
        let outcome = executor
            .insert(InsertStatement {
                table: table.clone(),
                rows,
                returning,
            })
            .await?;

        tracing::debug!(
            table = %table,
            tenant_id = %scope.tenant.tenant_id(),
            rows = row_count,
            rows_affected = outcome.rows_affected,
            "Inserted rows"
        );

        Ok(outcome)
    }
}
