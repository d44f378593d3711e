//! PostgreSQL adapters - Database implementations for the persistence ports.
//!
//! - `PostgresContractRepository` - contracts, duplicate prevention via partial unique index
//! - `PostgresDietRepository` - diets, renewal in a single transaction
//! - `PostgresPartyDirectory` - read-only view of user accounts

mod contract_repository;
mod diet_repository;
mod party_directory;

pub use contract_repository::PostgresContractRepository;
pub use diet_repository::PostgresDietRepository;
pub use party_directory::PostgresPartyDirectory;
