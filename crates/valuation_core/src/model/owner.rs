//! Owner record.
//!
//! # Invariants
//! - `national_id` is the identity; equality and hashing ignore `name`.

use super::record::Record;
use rusqlite::types::ToSql;
use rusqlite::Row;
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// Person owning valued assets, identified by national ID number.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Owner {
    national_id: String,
    name: String,
}

impl Owner {
    pub fn new(national_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            national_id: national_id.into(),
            name: name.into(),
        }
    }

    pub fn national_id(&self) -> &str {
        &self.national_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn with_name(&self, name: impl Into<String>) -> Self {
        Self::new(self.national_id.clone(), name)
    }
}

impl PartialEq for Owner {
    fn eq(&self, other: &Self) -> bool {
        self.national_id == other.national_id
    }
}

impl Eq for Owner {}

impl Hash for Owner {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.national_id.hash(state);
    }
}

impl Record for Owner {
    type Key = String;

    const TABLE: &'static str = "owners";
    const KEY_COLUMN: &'static str = "national_id";
    const VALUE_COLUMNS: &'static [&'static str] = &["name"];

    fn key(&self) -> &String {
        &self.national_id
    }

    fn values(&self) -> Vec<&dyn ToSql> {
        vec![&self.name as &dyn ToSql]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            national_id: row.get("national_id")?,
            name: row.get("name")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::Owner;
    use std::collections::HashSet;

    #[test]
    fn equality_and_hash_follow_national_id_only() {
        let first = Owner::new("1094", "Ana Rios");
        let renamed = first.with_name("Ana M. Rios");
        assert_eq!(first, renamed);
        assert_ne!(first, Owner::new("2081", "Ana Rios"));

        let set: HashSet<Owner> = [first, renamed, Owner::new("2081", "Luis Mora")]
            .into_iter()
            .collect();
        assert_eq!(set.len(), 2);
    }
}
