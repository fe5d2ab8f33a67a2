//! Record types persisted by the data-access layer.
//!
//! # Invariants
//! - Every record is a flat value keyed by a single identity field.
//! - No record owns or references another.

pub mod client;
pub mod country;
pub mod owner;
pub mod record;
