//! Statements dispatched to an underlying store.
//!
//! These are the fully-rewritten operations a guard hands to an
//! [`Executor`](super::Executor). By the time a statement exists, tenant
//! stamping and predicate substitution have already happened.

use serde_json::{Map, Value};

use crate::filter::Condition;
use crate::registry::ColumnRef;

/// A row: column name to value.
pub type Row = Map<String, Value>;

/// Sort direction for [`SelectStatement`] ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    /// Ascending order.
    #[default]
    Ascending,
    /// Descending order.
    Descending,
}

/// A read of one table.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectStatement {
    /// Target table.
    pub table: String,
    /// Columns to return; empty means all.
    pub columns: Vec<ColumnRef>,
    /// Row filter.
    pub filter: Option<Condition>,
    /// Ordering, applied left to right.
    pub order_by: Vec<(ColumnRef, SortDirection)>,
    /// Maximum number of rows.
    pub limit: Option<u64>,
    /// Number of rows to skip.
    pub offset: Option<u64>,
}

impl SelectStatement {
    /// Creates a select of all rows and columns of a table.
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            columns: Vec::new(),
            filter: None,
            order_by: Vec::new(),
            limit: None,
            offset: None,
        }
    }
}

/// An insert of one or more rows.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertStatement {
    /// Target table.
    pub table: String,
    /// Rows to write.
    pub rows: Vec<Row>,
    /// Whether to return the written rows.
    pub returning: bool,
}

/// An update of the rows matching a filter.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateStatement {
    /// Target table.
    pub table: String,
    /// Column values to set.
    pub values: Row,
    /// Row filter; `None` targets every row of the table.
    pub filter: Option<Condition>,
    /// Whether to return the updated rows.
    pub returning: bool,
}

/// A delete of the rows matching a filter.
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteStatement {
    /// Target table.
    pub table: String,
    /// Row filter; `None` targets every row of the table.
    pub filter: Option<Condition>,
    /// Whether to return the deleted rows.
    pub returning: bool,
}

/// A raw statement in the store's own query language with positional parameters.
///
/// Raw statements bypass every guard.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    /// Statement text.
    pub sql: String,
    /// Positional parameters.
    pub params: Vec<Value>,
}

impl Statement {
    /// Creates a statement without parameters.
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    /// Appends a positional parameter.
    pub fn bind(mut self, value: impl Into<Value>) -> Self {
        self.params.push(value.into());
        self
    }
}

/// Result of an insert, update or delete.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MutationOutcome {
    /// Number of rows written or removed.
    pub rows_affected: u64,
    /// The affected rows; populated only when the statement asked for them.
    pub rows: Vec<Row>,
}
