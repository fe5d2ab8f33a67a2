//! Generic data-access layer and its per-record accessors.
//!
//! # Responsibility
//! - Provide one reusable CRUD/list/count surface for every `Record`.
//! - Name the concrete accessors used by callers.
//!
//! # Invariants
//! - A `Dao` only ever touches the table of its record type, except for
//!   the caller-supplied SQL passed to `query_by_range`.
//! - Transaction scope belongs to the caller that owns the connection.

pub mod generic;

use crate::model::country::Country;
use crate::model::owner::Owner;

pub use generic::{Bounds, Dao, DaoError, DaoResult, QueryRow};

/// Data access for `countries`.
pub type CountryDao<'conn> = Dao<'conn, Country>;

/// Data access for `owners`.
pub type OwnerDao<'conn> = Dao<'conn, Owner>;
