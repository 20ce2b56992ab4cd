//! SQL rendering for the SQLite store.
//!
//! Turns guarded statements into SQL text with positional (`?N`) parameters.
//! Identifiers are always double-quoted; values are always bound.

use rusqlite::ToSql;
use rusqlite::types::{ToSqlOutput, ValueRef};
use serde_json::Value;

use crate::core::{DeleteStatement, Row, SelectStatement, SortDirection, UpdateStatement};
use crate::filter::{CompareOp, Condition};

/// A fragment of SQL with bound parameters.
#[derive(Debug, Clone, Default)]
pub struct SqlFragment {
    /// The SQL text.
    pub sql: String,
    /// Bound parameter values.
    pub params: Vec<SqlParam>,
}

/// A bound SQL parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    /// String parameter.
    String(String),
    /// Integer parameter.
    Integer(i64),
    /// Float parameter.
    Float(f64),
    /// Null parameter.
    Null,
}

impl From<&Value> for SqlParam {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => SqlParam::Null,
            Value::Bool(b) => SqlParam::Integer(i64::from(*b)),
            Value::Number(n) => match n.as_i64() {
                Some(i) => SqlParam::Integer(i),
                None => SqlParam::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => SqlParam::String(s.clone()),
            // Nested values are stored as JSON text.
            Value::Array(_) | Value::Object(_) => SqlParam::String(value.to_string()),
        }
    }
}

impl ToSql for SqlParam {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            SqlParam::String(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
            SqlParam::Integer(i) => ToSqlOutput::Borrowed(ValueRef::Integer(*i)),
            SqlParam::Float(f) => ToSqlOutput::Borrowed(ValueRef::Real(*f)),
            SqlParam::Null => ToSqlOutput::Borrowed(ValueRef::Null),
        })
    }
}

impl SqlFragment {
    /// Creates a new SQL fragment.
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    /// Adds a parameter and returns its placeholder.
    pub fn add_param(&mut self, param: SqlParam) -> String {
        self.params.push(param);
        format!("?{}", self.params.len())
    }

    fn push(&mut self, sql: &str) {
        self.sql.push_str(sql);
    }
}

/// Quotes an identifier, doubling embedded quotes.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Renders a condition, appending its parameters to `fragment`.
pub fn render_condition(condition: &Condition, fragment: &mut SqlFragment) -> String {
    match condition {
        Condition::Compare { column, op, value } => {
            let column = quote_ident(column.as_str());
            match (op, value) {
                (CompareOp::Eq, Value::Null) => format!("{} IS NULL", column),
                (CompareOp::Ne, Value::Null) => format!("{} IS NOT NULL", column),
                _ => {
                    let placeholder = fragment.add_param(SqlParam::from(value));
                    format!("{} {} {}", column, op.as_sql(), placeholder)
                }
            }
        }
        Condition::In { column, values } => {
            if values.is_empty() {
                return "1 = 0".to_string();
            }
            let placeholders: Vec<String> = values
                .iter()
                .map(|v| fragment.add_param(SqlParam::from(v)))
                .collect();
            format!(
                "{} IN ({})",
                quote_ident(column.as_str()),
                placeholders.join(", ")
            )
        }
        Condition::IsNull(column) => format!("{} IS NULL", quote_ident(column.as_str())),
        Condition::IsNotNull(column) => format!("{} IS NOT NULL", quote_ident(column.as_str())),
        Condition::And(parts) => join_conditions(parts, " AND ", "1 = 1", fragment),
        Condition::Or(parts) => join_conditions(parts, " OR ", "1 = 0", fragment),
        Condition::Not(inner) => format!("NOT ({})", render_condition(inner, fragment)),
    }
}

fn join_conditions(
    parts: &[Condition],
    separator: &str,
    empty: &str,
    fragment: &mut SqlFragment,
) -> String {
    if parts.is_empty() {
        return empty.to_string();
    }
    parts
        .iter()
        .map(|part| format!("({})", render_condition(part, fragment)))
        .collect::<Vec<_>>()
        .join(separator)
}

fn push_where(filter: Option<&Condition>, fragment: &mut SqlFragment) {
    if let Some(condition) = filter {
        let clause = render_condition(condition, fragment);
        fragment.push(" WHERE ");
        fragment.push(&clause);
    }
}

fn push_returning(returning: bool, fragment: &mut SqlFragment) {
    if returning {
        fragment.push(" RETURNING *");
    }
}

/// Renders a `SELECT`.
pub fn select_sql(statement: &SelectStatement) -> SqlFragment {
    let columns = if statement.columns.is_empty() {
        "*".to_string()
    } else {
        statement
            .columns
            .iter()
            .map(|c| quote_ident(c.as_str()))
            .collect::<Vec<_>>()
            .join(", ")
    };

    let mut fragment = SqlFragment::new(format!(
        "SELECT {} FROM {}",
        columns,
        quote_ident(&statement.table)
    ));
    push_where(statement.filter.as_ref(), &mut fragment);

    if !statement.order_by.is_empty() {
        let order = statement
            .order_by
            .iter()
            .map(|(column, direction)| {
                let direction = match direction {
                    SortDirection::Ascending => "ASC",
                    SortDirection::Descending => "DESC",
                };
                format!("{} {}", quote_ident(column.as_str()), direction)
            })
            .collect::<Vec<_>>()
            .join(", ");
        fragment.push(" ORDER BY ");
        fragment.push(&order);
    }

    match (statement.limit, statement.offset) {
        (None, None) => {}
        (limit, offset) => {
            // SQLite requires LIMIT before OFFSET; -1 means unbounded.
            let limit = limit.map_or(-1, |l| i64::try_from(l).unwrap_or(i64::MAX));
            let placeholder = fragment.add_param(SqlParam::Integer(limit));
            fragment.push(&format!(" LIMIT {}", placeholder));
            if let Some(offset) = offset {
                let offset = i64::try_from(offset).unwrap_or(i64::MAX);
                let placeholder = fragment.add_param(SqlParam::Integer(offset));
                fragment.push(&format!(" OFFSET {}", placeholder));
            }
        }
    }

    fragment
}

/// Renders an `INSERT` of one row.
pub fn insert_sql(table: &str, row: &Row, returning: bool) -> SqlFragment {
    let mut fragment = SqlFragment::new(format!("INSERT INTO {}", quote_ident(table)));

    if row.is_empty() {
        fragment.push(" DEFAULT VALUES");
    } else {
        let columns: Vec<String> = row.keys().map(|c| quote_ident(c)).collect();
        let placeholders: Vec<String> = row
            .values()
            .map(|v| fragment.add_param(SqlParam::from(v)))
            .collect();
        fragment.push(&format!(
            " ({}) VALUES ({})",
            columns.join(", "),
            placeholders.join(", ")
        ));
    }

    push_returning(returning, &mut fragment);
    fragment
}

/// Renders an `UPDATE`.
pub fn update_sql(statement: &UpdateStatement) -> SqlFragment {
    let mut fragment = SqlFragment::new(format!("UPDATE {} SET ", quote_ident(&statement.table)));
    let assignments: Vec<String> = statement
        .values
        .iter()
        .map(|(column, value)| {
            let placeholder = fragment.add_param(SqlParam::from(value));
            format!("{} = {}", quote_ident(column), placeholder)
        })
        .collect();
    fragment.push(&assignments.join(", "));
    push_where(statement.filter.as_ref(), &mut fragment);
    push_returning(statement.returning, &mut fragment);
    fragment
}

/// Renders a `DELETE`.
pub fn delete_sql(statement: &DeleteStatement) -> SqlFragment {
    let mut fragment = SqlFragment::new(format!("DELETE FROM {}", quote_ident(&statement.table)));
    push_where(statement.filter.as_ref(), &mut fragment);
    push_returning(statement.returning, &mut fragment);
    fragment
}
