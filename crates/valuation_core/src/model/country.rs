//! Country record.
//!
//! # Invariants
//! - `code` is the identity; equality and hashing ignore `name`.

use super::record::Record;
use rusqlite::types::ToSql;
use rusqlite::Row;
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// Country identified by its short code (for example `co`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Country {
    code: String,
    name: String,
}

impl Country {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns a copy carrying the same code and a new name.
    pub fn with_name(&self, name: impl Into<String>) -> Self {
        Self::new(self.code.clone(), name)
    }
}

impl PartialEq for Country {
    fn eq(&self, other: &Self) -> bool {
        self.code == other.code
    }
}

impl Eq for Country {}

impl Hash for Country {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.code.hash(state);
    }
}

impl Record for Country {
    type Key = String;

    const TABLE: &'static str = "countries";
    const KEY_COLUMN: &'static str = "code";
    const VALUE_COLUMNS: &'static [&'static str] = &["name"];

    fn key(&self) -> &String {
        &self.code
    }

    fn values(&self) -> Vec<&dyn ToSql> {
        vec![&self.name as &dyn ToSql]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            code: row.get("code")?,
            name: row.get("name")?,
        })
    }
}
