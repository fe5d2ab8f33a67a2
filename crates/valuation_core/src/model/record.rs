//! Storage contract shared by every record a `Dao` can manage.
//!
//! # Responsibility
//! - Describe where a record lives (table, key column, value columns).
//! - Convert a record to bind parameters and back from a result row.
//!
//! # Invariants
//! - Each record type has exactly one identity column, `KEY_COLUMN`.
//! - `values()` yields parameters in the same order as `VALUE_COLUMNS`.
//! - `from_row` reads columns by name, so column order in a `SELECT` is free.

use rusqlite::types::ToSql;
use rusqlite::Row;
use std::fmt::Debug;

/// A flat record persisted in one table and identified by one key column.
pub trait Record: Sized {
    /// Identity key type bound as the first parameter of keyed statements.
    type Key: ToSql + Debug;

    /// Table holding every record of this type.
    const TABLE: &'static str;
    /// Identity column.
    const KEY_COLUMN: &'static str;
    /// Non-key columns, written on insert and replaced on merge.
    const VALUE_COLUMNS: &'static [&'static str];

    fn key(&self) -> &Self::Key;

    /// Bind parameters for `VALUE_COLUMNS`, in order.
    fn values(&self) -> Vec<&dyn ToSql>;

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;
}
