//! Statement execution shared by the store and its transactions.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use rusqlite::types::ValueRef;
use rusqlite::{Connection, params_from_iter};
use serde_json::{Number, Value};

use crate::core::{
    DeleteStatement, InsertStatement, MutationOutcome, Row, SelectStatement, Statement,
    UpdateStatement,
};
use crate::error::StorageResult;

use super::sql::{self, SqlFragment, SqlParam};

fn column_value(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) => Number::from_f64(f).map_or(Value::Null, Value::Number),
        ValueRef::Text(text) => Value::String(String::from_utf8_lossy(text).into_owned()),
        ValueRef::Blob(bytes) => Value::String(BASE64.encode(bytes)),
    }
}

fn query_rows(conn: &Connection, fragment: &SqlFragment) -> StorageResult<Vec<Row>> {
    let mut stmt = conn.prepare(&fragment.sql)?;
    let names: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

    let mut rows = stmt.query(params_from_iter(fragment.params.iter()))?;
    let mut result = Vec::new();
    while let Some(row) = rows.next()? {
        let mut out = Row::new();
        for (idx, name) in names.iter().enumerate() {
            out.insert(name.clone(), column_value(row.get_ref(idx)?));
        }
        result.push(out);
    }
    Ok(result)
}

fn execute_fragment(conn: &Connection, fragment: &SqlFragment) -> StorageResult<u64> {
    let changed = conn.execute(&fragment.sql, params_from_iter(fragment.params.iter()))?;
    Ok(changed as u64)
}

fn mutate(conn: &Connection, fragment: &SqlFragment, returning: bool) -> StorageResult<MutationOutcome> {
    if returning {
        let rows = query_rows(conn, fragment)?;
        Ok(MutationOutcome {
            rows_affected: rows.len() as u64,
            rows,
        })
    } else {
        Ok(MutationOutcome {
            rows_affected: execute_fragment(conn, fragment)?,
            rows: Vec::new(),
        })
    }
}

pub(crate) fn select(conn: &Connection, statement: &SelectStatement) -> StorageResult<Vec<Row>> {
    query_rows(conn, &sql::select_sql(statement))
}

/// Inserts every row or none of them.
pub(crate) fn insert(conn: &mut Connection, statement: &InsertStatement) -> StorageResult<MutationOutcome> {
    let savepoint = conn.savepoint()?;
    let mut outcome = MutationOutcome::default();

    for row in &statement.rows {
        let fragment = sql::insert_sql(&statement.table, row, statement.returning);
        let written = mutate(&savepoint, &fragment, statement.returning)?;
        outcome.rows_affected += written.rows_affected;
        outcome.rows.extend(written.rows);
    }

    savepoint.commit()?;
    Ok(outcome)
}

pub(crate) fn update(conn: &Connection, statement: &UpdateStatement) -> StorageResult<MutationOutcome> {
    mutate(conn, &sql::update_sql(statement), statement.returning)
}

pub(crate) fn delete(conn: &Connection, statement: &DeleteStatement) -> StorageResult<MutationOutcome> {
    mutate(conn, &sql::delete_sql(statement), statement.returning)
}

fn raw_fragment(statement: &Statement) -> SqlFragment {
    SqlFragment {
        sql: statement.sql.clone(),
        params: statement.params.iter().map(SqlParam::from).collect(),
    }
}

pub(crate) fn query(conn: &Connection, statement: &Statement) -> StorageResult<Vec<Row>> {
    query_rows(conn, &raw_fragment(statement))
}

pub(crate) fn execute(conn: &Connection, statement: &Statement) -> StorageResult<u64> {
    execute_fragment(conn, &raw_fragment(statement))
}
