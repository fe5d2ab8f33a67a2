//! Data-access core for the valuation center records.
//! Owns storage bootstrap, record types, the generic DAO and repositories.

pub mod dao;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;

pub use dao::{Bounds, CountryDao, Dao, DaoError, DaoResult, OwnerDao, QueryRow};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::client::{Client, ClientId, ClientValidationError};
pub use model::country::Country;
pub use model::owner::Owner;
pub use model::record::Record;
pub use repo::client_repo::{ClientRepository, RepoError, RepoResult, SqliteClientRepository};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
