//! Client CRUD repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide the standard save/find/list/delete/count operations for
//!   `clients`, keyed by the store-assigned numeric id.
//!
//! # Invariants
//! - Write paths call `Client::validate()` before any SQL mutation.
//! - `save` of an unsaved client returns it with the assigned id.
//! - `delete_by_id` on a missing id reports `NotFound`.

use crate::db::schema::{find_schema_gap, SchemaGap};
use crate::db::DbError;
use crate::model::client::{Client, ClientId, ClientValidationError};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const CLIENT_SELECT_SQL: &str = "SELECT
    id,
    first_name,
    last_name,
    email,
    created_at
FROM clients";

const CLIENT_COLUMNS: &[&str] = &["id", "first_name", "last_name", "email", "created_at"];

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for client persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(ClientValidationError),
    Db(DbError),
    NotFound(ClientId),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "client not found: {id}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "client repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "client repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "client repository requires column `{column}` in table `{table}`"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted client data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ClientValidationError> for RepoError {
    fn from(value: ClientValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<SchemaGap> for RepoError {
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

/// Standard CRUD operations for clients.
pub trait ClientRepository {
    /// Inserts an unsaved client or replaces the stored one with the same id.
    fn save(&self, client: &Client) -> RepoResult<Client>;
    fn find_by_id(&self, id: ClientId) -> RepoResult<Option<Client>>;
    /// Returns every client ordered by id.
    fn find_all(&self) -> RepoResult<Vec<Client>>;
    fn delete_by_id(&self, id: ClientId) -> RepoResult<()>;
    fn count(&self) -> RepoResult<u64>;
    fn exists_by_id(&self, id: ClientId) -> RepoResult<bool>;
}

/// SQLite-backed client repository.
pub struct SqliteClientRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteClientRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        if let Some(gap) = find_schema_gap(conn, "clients", CLIENT_COLUMNS)? {
            return Err(gap.into());
        }
        Ok(Self { conn })
    }
}

impl ClientRepository for SqliteClientRepository<'_> {
    fn save(&self, client: &Client) -> RepoResult<Client> {
        client.validate()?;

        let Some(id) = client.id else {
            self.conn.execute(
                "INSERT INTO clients (first_name, last_name, email, created_at)
                 VALUES (?1, ?2, ?3, ?4);",
                params![
                    client.first_name.as_str(),
                    client.last_name.as_str(),
                    client.email.as_str(),
                    client.created_at,
                ],
            )?;
            return Ok(Client {
                id: Some(self.conn.last_insert_rowid()),
                ..client.clone()
            });
        };

        self.conn.execute(
            "INSERT INTO clients (id, first_name, last_name, email, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(id) DO UPDATE SET
                first_name = excluded.first_name,
                last_name = excluded.last_name,
                email = excluded.email,
                created_at = excluded.created_at;",
            params![
                id,
                client.first_name.as_str(),
                client.last_name.as_str(),
                client.email.as_str(),
                client.created_at,
            ],
        )?;
        Ok(client.clone())
    }

    fn find_by_id(&self, id: ClientId) -> RepoResult<Option<Client>> {
        self.conn
            .query_row(
                &format!("{CLIENT_SELECT_SQL} WHERE id = ?1;"),
                [id],
                parse_client_row,
            )
            .optional()?
            .map(validated)
            .transpose()
    }

    fn find_all(&self) -> RepoResult<Vec<Client>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{CLIENT_SELECT_SQL} ORDER BY id ASC;"))?;
        let clients = stmt
            .query_map([], parse_client_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        clients.into_iter().map(validated).collect()
    }

    fn delete_by_id(&self, id: ClientId) -> RepoResult<()> {
        let changed = self.conn.execute("DELETE FROM clients WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }

    fn count(&self) -> RepoResult<u64> {
        let total: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM clients;", [], |row| row.get(0))?;
        u64::try_from(total)
            .map_err(|_| RepoError::InvalidData(format!("negative client count {total}")))
    }

    fn exists_by_id(&self, id: ClientId) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM clients WHERE id = ?1);",
            [id],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }
}

fn parse_client_row(row: &Row<'_>) -> rusqlite::Result<Client> {
    Ok(Client {
        id: Some(row.get("id")?),
        first_name: row.get("first_name")?,
        last_name: row.get("last_name")?,
        email: row.get("email")?,
        created_at: row.get("created_at")?,
    })
}

// Read paths reject invalid persisted rows instead of masking them.
fn validated(client: Client) -> RepoResult<Client> {
    client.validate().map_err(|err| {
        RepoError::InvalidData(format!(
            "client {} failed validation: {err}",
            client.id.unwrap_or_default()
        ))
    })?;
    Ok(client)
}
