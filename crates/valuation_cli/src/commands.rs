//! Command handlers; each prints records as JSON lines on stdout.

use crate::{ClientAction, KeyedAction};
use anyhow::{bail, Context};
use rusqlite::types::Value;
use rusqlite::Connection;
use serde::Serialize;
use valuation_core::db::migrations::{current_version, latest_version};
use valuation_core::{
    Client, ClientRepository, CountryDao, Dao, OwnerDao, Record, SqliteClientRepository,
};

pub fn run_status(conn: &Connection) -> anyhow::Result<()> {
    let countries = CountryDao::try_new(conn)?.count()?;
    let owners = OwnerDao::try_new(conn)?.count()?;
    let clients = SqliteClientRepository::try_new(conn)?.count()?;

    println!("core_version={}", valuation_core::core_version());
    println!(
        "schema_version={} latest_supported={}",
        current_version(conn)?,
        latest_version()
    );
    println!("countries={countries} owners={owners} clients={clients}");
    Ok(())
}

/// Handles commands for records keyed by a string with a single `name`.
pub fn run_keyed<R>(
    conn: &Connection,
    action: KeyedAction,
    build: impl Fn(String, String) -> R,
) -> anyhow::Result<()>
where
    R: Record<Key = String> + Serialize,
{
    let dao = Dao::<R>::try_new(conn)?;
    match action {
        KeyedAction::Add { key, name } => print_json(&dao.insert(build(key, name))?),
        KeyedAction::Get { key } => match dao.find_by_key(key.as_str())? {
            Some(record) => print_json(&record),
            None => bail!("no record `{key}` in {}", dao.record_table()),
        },
        KeyedAction::Rename { key, name } => print_json(&dao.update(&build(key, name))?),
        KeyedAction::List { start, end } => {
            let records = match end {
                Some(end) => dao.find_range([start.unwrap_or(0), end])?,
                None => dao.get_all_in(start.unwrap_or(0), 0)?,
            };
            records.iter().try_for_each(print_json)
        }
        KeyedAction::Rm { key } => {
            let record = dao
                .find_by_key(key.as_str())?
                .with_context(|| format!("no record `{key}` in {}", dao.record_table()))?;
            dao.remove(&record)?;
            Ok(())
        }
        KeyedAction::Count => {
            println!("{}", dao.count()?);
            Ok(())
        }
    }
}

pub fn run_client(conn: &Connection, action: ClientAction) -> anyhow::Result<()> {
    let repo = SqliteClientRepository::try_new(conn)?;
    match action {
        ClientAction::Add {
            first_name,
            last_name,
            email,
        } => print_json(&repo.save(&Client::new(first_name, last_name, email))?),
        ClientAction::Get { id } => match repo.find_by_id(id)? {
            Some(client) => print_json(&client),
            None => bail!("no client with id {id}"),
        },
        ClientAction::List => repo.find_all()?.iter().try_for_each(print_json),
        ClientAction::Rm { id } => Ok(repo.delete_by_id(id)?),
        ClientAction::Count => {
            println!("{}", repo.count()?);
            Ok(())
        }
    }
}

pub fn run_query(
    conn: &Connection,
    sql: &str,
    start: Option<i64>,
    end: Option<i64>,
) -> anyhow::Result<()> {
    // Ad-hoc SQL is not tied to a table; any migrated accessor can run it.
    let dao = CountryDao::try_new(conn)?;
    let rows = match end {
        Some(end) => dao.query_by_bounds(sql, [start.unwrap_or(0), end])?,
        None => dao.query_by_range(sql, start.unwrap_or(0), 0)?,
    };
    rows.iter().try_for_each(|row| print_json(&row_to_json(row)))
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string(value)?);
    Ok(())
}

fn row_to_json(row: &[Value]) -> serde_json::Value {
    serde_json::Value::Array(row.iter().map(value_to_json).collect())
}

fn value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Integer(number) => serde_json::Value::from(*number),
        Value::Real(number) => serde_json::Number::from_f64(*number)
            .map_or(serde_json::Value::Null, serde_json::Value::Number),
        Value::Text(text) => serde_json::Value::from(text.as_str()),
        Value::Blob(bytes) => serde_json::Value::from(bytes.clone()),
    }
}
