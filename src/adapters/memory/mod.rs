//! In-memory adapters for the persistence ports.
//!
//! Used by tests and for running the service logic without a database.

mod contract_repository;
mod diet_repository;
mod party_directory;

pub use contract_repository::InMemoryContractRepository;
pub use diet_repository::InMemoryDietRepository;
pub use party_directory::InMemoryPartyDirectory;
