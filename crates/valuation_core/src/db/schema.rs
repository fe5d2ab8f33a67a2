//! Readiness checks run before a repository accepts a connection.

use super::migrations::{current_version, latest_version};
use super::DbResult;
use rusqlite::Connection;

/// First mismatch found between a connection and what a repository needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaGap {
    Version { expected: u32, actual: u32 },
    Table(&'static str),
    Column {
        table: &'static str,
        column: &'static str,
    },
}

/// Returns `None` when `table` exists with every column in `columns` and the
/// connection is at the latest schema version.
pub(crate) fn find_schema_gap(
    conn: &Connection,
    table: &'static str,
    columns: &[&'static str],
) -> DbResult<Option<SchemaGap>> {
    let expected = latest_version();
    let actual = current_version(conn)?;
    if actual != expected {
        return Ok(Some(SchemaGap::Version { expected, actual }));
    }

    if !table_exists(conn, table)? {
        return Ok(Some(SchemaGap::Table(table)));
    }

    let present = table_columns(conn, table)?;
    Ok(columns
        .iter()
        .copied()
        .find(|column| !present.iter().any(|name| name == column))
        .map(|column| SchemaGap::Column { table, column }))
}

fn table_exists(conn: &Connection, table: &str) -> DbResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_columns(conn: &Connection, table: &str) -> DbResult<Vec<String>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(names)
}
