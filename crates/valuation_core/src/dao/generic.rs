//! Generic data-access object over any `Record`.
//!
//! # Responsibility
//! - Offer insert/update/remove/find/list/count for one record type.
//! - Translate offset/limit conventions into SQL paging clauses.
//!
//! # Invariants
//! - Paging arguments `<= 0` mean "from the start" / "unbounded".
//! - Range bounds are `[start, end)`; `end < start` or an overflowing span is
//!   rejected.
//! - Listing order is the record key ascending.
//! - Store failures are returned with their `rusqlite` source attached.

use crate::db::schema::{find_schema_gap, SchemaGap};
use crate::db::DbError;
use crate::model::record::Record;
use log::debug;
use rusqlite::types::{ToSql, Value};
use rusqlite::{params_from_iter, Connection, OptionalExtension};
use std::borrow::Borrow;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::marker::PhantomData;

pub type DaoResult<T> = Result<T, DaoError>;

/// One untyped result row of an ad-hoc query, in select-list order.
pub type QueryRow = Vec<Value>;

/// Half-open index range `[start, end)` over a result list.
pub type Bounds = [i64; 2];

/// Failures returned by `Dao` operations.
#[derive(Debug)]
pub enum DaoError {
    /// Error raised by the store itself (constraint, syntax, I/O).
    Db(DbError),
    /// Range whose end precedes its start, or whose span overflows `i64`.
    InvalidRange { start: i64, end: i64 },
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Record table is absent from the connection's schema.
    MissingRequiredTable(&'static str),
    /// Record table lacks one of the record's declared columns.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    /// Stored data cannot be represented by the record type.
    InvalidData(String),
}

impl Display for DaoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidRange { start, end } => write!(
                f,
                "invalid range [{start}, {end}): end precedes start or span overflows"
            ),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "data access requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "data access requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "data access requires column `{column}` in table `{table}`")
            }
            Self::InvalidData(message) => write!(f, "invalid stored data: {message}"),
        }
    }
}

impl Error for DaoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for DaoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for DaoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<SchemaGap> for DaoError {
    fn from(value: SchemaGap) -> Self {
        match value {
            SchemaGap::Version { expected, actual } => Self::UninitializedConnection {
                expected_version: expected,
                actual_version: actual,
            },
            SchemaGap::Table(table) => Self::MissingRequiredTable(table),
            SchemaGap::Column { table, column } => Self::MissingRequiredColumn { table, column },
        }
    }
}

/// Data-access object for records of type `R`, borrowing one connection.
///
/// The type parameter is the only configuration: table, key column and row
/// mapping all come from `R`'s `Record` implementation.
pub struct Dao<'conn, R: Record> {
    conn: &'conn Connection,
    record: PhantomData<fn() -> R>,
}

impl<'conn, R: Record> Dao<'conn, R> {
    /// Binds a DAO to a migrated connection.
    ///
    /// # Errors
    /// - `UninitializedConnection` when migrations have not been applied.
    /// - `MissingRequiredTable` / `MissingRequiredColumn` when `R`'s table
    ///   does not match its declared columns.
    pub fn try_new(conn: &'conn Connection) -> DaoResult<Self> {
        let mut columns = Vec::with_capacity(R::VALUE_COLUMNS.len() + 1);
        columns.push(R::KEY_COLUMN);
        columns.extend_from_slice(R::VALUE_COLUMNS);

        if let Some(gap) = find_schema_gap(conn, R::TABLE, &columns)? {
            return Err(gap.into());
        }

        Ok(Self {
            conn,
            record: PhantomData,
        })
    }

    /// Table this DAO reads and writes.
    pub fn record_table(&self) -> &'static str {
        R::TABLE
    }

    /// Persists a new record and hands it back.
    ///
    /// A duplicate key fails with the store's constraint error.
    pub fn insert(&self, record: R) -> DaoResult<R> {
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({});",
            R::TABLE,
            column_list::<R>(),
            placeholders::<R>()
        );
        self.conn.execute(&sql, params_from_iter(bind_params(&record)))?;
        Ok(record)
    }

    /// Merges `record` into the store (full replace of non-key columns, or
    /// insert when the key is new) and returns the stored result.
    pub fn update(&self, record: &R) -> DaoResult<R> {
        let conflict_action = if R::VALUE_COLUMNS.is_empty() {
            "NOTHING".to_string()
        } else {
            let assignments = R::VALUE_COLUMNS
                .iter()
                .map(|column| format!("{column} = excluded.{column}"))
                .collect::<Vec<_>>()
                .join(", ");
            format!("UPDATE SET {assignments}")
        };
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({}) ON CONFLICT({}) DO {conflict_action};",
            R::TABLE,
            column_list::<R>(),
            placeholders::<R>(),
            R::KEY_COLUMN
        );
        self.conn.execute(&sql, params_from_iter(bind_params(record)))?;

        self.find_by_key(record.key())?.ok_or_else(|| {
            DaoError::InvalidData(format!(
                "merged row {:?} missing from `{}`",
                record.key(),
                R::TABLE
            ))
        })
    }

    /// Deletes the stored row carrying `record`'s key.
    ///
    /// Removing a record that is not stored is a no-op.
    pub fn remove(&self, record: &R) -> DaoResult<()> {
        let removed = self.conn.execute(
            &format!("DELETE FROM {} WHERE {} = ?1;", R::TABLE, R::KEY_COLUMN),
            [record.key()],
        )?;
        debug!(
            "event=dao_remove module=dao status=ok table={} removed_rows={removed}",
            R::TABLE
        );
        Ok(())
    }

    /// Looks up one record by key; `None` when absent.
    pub fn find_by_key<Q>(&self, key: &Q) -> DaoResult<Option<R>>
    where
        R::Key: Borrow<Q>,
        Q: ToSql + ?Sized,
    {
        let sql = format!("{} WHERE {} = ?1;", select_sql::<R>(), R::KEY_COLUMN);
        let found = self
            .conn
            .query_row(&sql, [key], |row| R::from_row(row))
            .optional()?;
        Ok(found)
    }

    /// Lists records in key order, skipping `first_result` rows when positive
    /// and returning at most `max_results` rows when positive.
    pub fn get_all_in(&self, first_result: i64, max_results: i64) -> DaoResult<Vec<R>> {
        let mut sql = format!("{} ORDER BY {} ASC", select_sql::<R>(), R::KEY_COLUMN);
        let bind_values = push_page_clause(&mut sql, first_result, max_results);

        let mut stmt = self.conn.prepare(&sql)?;
        let records = stmt
            .query_map(params_from_iter(bind_values), |row| R::from_row(row))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }

    /// Lists every record of this type.
    pub fn get_all(&self) -> DaoResult<Vec<R>> {
        self.get_all_in(-1, -1)
    }

    /// Lists the records at positions `[start, end)`.
    ///
    /// Same as `get_all_in(start, end - start)`; an empty span therefore
    /// means "no limit" as it does for `get_all_in`.
    pub fn find_range(&self, bounds: Bounds) -> DaoResult<Vec<R>> {
        let (first_result, max_results) = bounds_to_page(bounds)?;
        self.get_all_in(first_result, max_results)
    }

    /// Runs an arbitrary SQL query and returns untyped rows, paged with the
    /// same convention as `get_all_in`.
    ///
    /// Paging wraps the statement in a subquery, so a paged statement must be
    /// a query SQLite accepts in `FROM (...)`.
    pub fn query_by_range(
        &self,
        sql: &str,
        first_result: i64,
        max_results: i64,
    ) -> DaoResult<Vec<QueryRow>> {
        let statement = strip_terminators(sql);
        // Newline keeps a trailing `--` comment from swallowing the `)`.
        let mut text = if first_result > 0 || max_results > 0 {
            format!("SELECT * FROM ({statement}\n)")
        } else {
            statement.to_string()
        };
        let bind_values = push_page_clause(&mut text, first_result, max_results);
        debug!(
            "event=dao_query module=dao status=start table={} first_result={first_result} max_results={max_results}",
            R::TABLE
        );

        let mut stmt = self.conn.prepare(&text)?;
        let column_count = stmt.column_count();
        let rows = stmt
            .query_map(params_from_iter(bind_values), |row| {
                (0..column_count)
                    .map(|index| row.get::<_, Value>(index))
                    .collect::<rusqlite::Result<QueryRow>>()
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// `query_by_range` over the positions `[start, end)`.
    pub fn query_by_bounds(&self, sql: &str, bounds: Bounds) -> DaoResult<Vec<QueryRow>> {
        let (first_result, max_results) = bounds_to_page(bounds)?;
        self.query_by_range(sql, first_result, max_results)
    }

    /// Number of stored records of this type.
    pub fn count(&self) -> DaoResult<u64> {
        let total: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {};", R::TABLE),
            [],
            |row| row.get(0),
        )?;
        u64::try_from(total)
            .map_err(|_| DaoError::InvalidData(format!("negative row count {total}")))
    }
}

fn select_sql<R: Record>() -> String {
    format!("SELECT {} FROM {}", column_list::<R>(), R::TABLE)
}

fn column_list<R: Record>() -> String {
    std::iter::once(R::KEY_COLUMN)
        .chain(R::VALUE_COLUMNS.iter().copied())
        .collect::<Vec<_>>()
        .join(", ")
}

fn placeholders<R: Record>() -> String {
    (1..=R::VALUE_COLUMNS.len() + 1)
        .map(|index| format!("?{index}"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn bind_params<R: Record>(record: &R) -> Vec<&dyn ToSql> {
    let mut params: Vec<&dyn ToSql> = Vec::with_capacity(R::VALUE_COLUMNS.len() + 1);
    params.push(record.key() as &dyn ToSql);
    params.extend(record.values());
    params
}

/// Appends `LIMIT`/`OFFSET` for the positive arguments and returns their
/// bind values in placeholder order.
fn push_page_clause(sql: &mut String, first_result: i64, max_results: i64) -> Vec<Value> {
    let mut bind_values = Vec::new();
    if max_results > 0 {
        sql.push_str(" LIMIT ?");
        bind_values.push(Value::Integer(max_results));
        if first_result > 0 {
            sql.push_str(" OFFSET ?");
            bind_values.push(Value::Integer(first_result));
        }
    } else if first_result > 0 {
        sql.push_str(" LIMIT -1 OFFSET ?");
        bind_values.push(Value::Integer(first_result));
    }
    bind_values
}

fn bounds_to_page([start, end]: Bounds) -> DaoResult<(i64, i64)> {
    match end.checked_sub(start) {
        Some(span) if span >= 0 => Ok((start, span)),
        _ => Err(DaoError::InvalidRange { start, end }),
    }
}

fn strip_terminators(sql: &str) -> &str {
    let mut statement = sql.trim();
    while let Some(rest) = statement.strip_suffix(';') {
        statement = rest.trim_end();
    }
    statement
}

#[cfg(test)]
mod tests {
    use super::{bounds_to_page, push_page_clause, strip_terminators, DaoError};
    use rusqlite::types::Value;

    #[test]
    fn page_clause_skips_non_positive_arguments() {
        let mut sql = String::from("SELECT 1");
        assert!(push_page_clause(&mut sql, 0, -3).is_empty());
        assert_eq!(sql, "SELECT 1");
    }

    #[test]
    fn page_clause_orders_limit_before_offset() {
        let mut sql = String::new();
        let binds = push_page_clause(&mut sql, 4, 2);
        assert_eq!(sql, " LIMIT ? OFFSET ?");
        assert_eq!(binds, vec![Value::Integer(2), Value::Integer(4)]);

        let mut offset_only = String::new();
        let binds = push_page_clause(&mut offset_only, 4, 0);
        assert_eq!(offset_only, " LIMIT -1 OFFSET ?");
        assert_eq!(binds, vec![Value::Integer(4)]);
    }

    #[test]
    fn bounds_convert_to_offset_and_span() {
        assert_eq!(bounds_to_page([2, 5]).unwrap(), (2, 3));
        assert_eq!(bounds_to_page([3, 3]).unwrap(), (3, 0));
        assert!(matches!(
            bounds_to_page([5, 2]),
            Err(DaoError::InvalidRange { start: 5, end: 2 })
        ));
        assert_eq!(bounds_to_page([0, i64::MAX]).unwrap(), (0, i64::MAX));
        assert!(matches!(
            bounds_to_page([-1, i64::MAX]),
            Err(DaoError::InvalidRange { start: -1, .. })
        ));
        assert!(matches!(
            bounds_to_page([i64::MIN, 0]),
            Err(DaoError::InvalidRange { .. })
        ));
    }

    #[test]
    fn terminators_are_stripped_with_interleaved_whitespace() {
        assert_eq!(strip_terminators(" SELECT 1 ; ;\n"), "SELECT 1");
        assert_eq!(strip_terminators("SELECT 1;;"), "SELECT 1");
        assert_eq!(strip_terminators("SELECT 1 -- note"), "SELECT 1 -- note");
    }
}
