//! Schema introspection for the SQLite store.

use rusqlite::Connection;

use crate::audit::TableSchema;
use crate::error::StorageResult;

use super::sql::quote_ident;

/// Lists user tables and their columns, ordered by table name.
pub(crate) fn describe_tables(conn: &Connection) -> StorageResult<Vec<TableSchema>> {
    let mut stmt = conn.prepare(
        "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
    )?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;

    let mut tables = Vec::with_capacity(names.len());
    for name in names {
        let mut info = conn.prepare(&format!("PRAGMA table_info({})", quote_ident(&name)))?;
        let columns = info
            .query_map([], |row| row.get::<_, String>(1))?
            .collect::<Result<Vec<_>, _>>()?;
        tables.push(TableSchema::new(name, columns));
    }

    tracing::debug!(tables = tables.len(), "Described SQLite schema");
    Ok(tables)
}
