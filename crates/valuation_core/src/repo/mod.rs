//! Hand-written CRUD repositories.
//!
//! # Responsibility
//! - Expose use-case shaped persistence contracts as traits.
//! - Keep SQL details behind the SQLite implementations.

pub mod client_repo;
