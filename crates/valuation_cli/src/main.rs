//! `valuation` command-line front end.
//!
//! # Responsibility
//! - Parse global configuration (database path, logging) from flags/env.
//! - Dispatch record commands to `valuation_core` data-access objects.

mod commands;

use clap::{Parser, Subcommand};
use log::info;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "valuation")]
#[command(version)]
#[command(about = "Manage countries, owners and clients of the valuation center")]
struct Cli {
    /// SQLite database file (created and migrated on first use)
    #[arg(long, global = true, env = "VALUATION_DB", default_value = "valuation.sqlite3")]
    db: PathBuf,

    /// Log level: trace|debug|info|warn|error
    #[arg(long, global = true, env = "VALUATION_LOG_LEVEL")]
    log_level: Option<String>,

    /// Absolute directory for rolling log files; logging is off when unset
    #[arg(long, global = true, env = "VALUATION_LOG_DIR")]
    log_dir: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print versions and record counts
    Status,

    /// Manage countries (keyed by code)
    Country {
        #[command(subcommand)]
        action: KeyedAction,
    },

    /// Manage owners (keyed by national ID)
    Owner {
        #[command(subcommand)]
        action: KeyedAction,
    },

    /// Manage clients (keyed by numeric id)
    Client {
        #[command(subcommand)]
        action: ClientAction,
    },

    /// Run an ad-hoc SQL query and print untyped rows
    Query {
        sql: String,

        /// First row index to return
        #[arg(long)]
        start: Option<i64>,

        /// Row index to stop before
        #[arg(long)]
        end: Option<i64>,
    },
}

#[derive(Subcommand)]
pub(crate) enum KeyedAction {
    /// Insert a new record
    Add { key: String, name: String },
    /// Show one record
    Get { key: String },
    /// Replace the name of a record (inserting it when absent)
    Rename { key: String, name: String },
    /// List records, optionally the positions [start, end)
    List {
        #[arg(long)]
        start: Option<i64>,
        #[arg(long)]
        end: Option<i64>,
    },
    /// Remove a record
    Rm { key: String },
    /// Count records
    Count,
}

#[derive(Subcommand)]
pub(crate) enum ClientAction {
    /// Register a new client
    Add {
        first_name: String,
        last_name: String,
        email: String,
    },
    /// Show one client
    Get { id: i64 },
    /// List every client
    List,
    /// Delete a client
    Rm { id: i64 },
    /// Count clients
    Count,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli
            .log_level
            .as_deref()
            .unwrap_or(valuation_core::default_log_level());
        valuation_core::init_logging(level, log_dir)?;
    }

    let conn = valuation_core::db::open_db(&cli.db)?;
    info!("event=cli_start module=cli status=ok db={}", cli.db.display());
    match cli.command {
        Command::Status => commands::run_status(&conn),
        Command::Country { action } => {
            commands::run_keyed(&conn, action, valuation_core::Country::new)
        }
        Command::Owner { action } => commands::run_keyed(&conn, action, valuation_core::Owner::new),
        Command::Client { action } => commands::run_client(&conn, action),
        Command::Query { sql, start, end } => commands::run_query(&conn, &sql, start, end),
    }
}
