//! Contract repository port.
//!
//! Persistence for `Contract` aggregates. Two operations carry the
//! concurrency guarantees the lifecycle depends on:
//!
//! - `insert_pending` is an atomic insert-if-no-open-contract for the pair
//! - `update` is a compare-and-set on (status, version)
//!
//! Nothing else locks; contract transitions never span entities.

use async_trait::async_trait;

use crate::domain::contract::{Contract, ContractStatus};
use crate::domain::foundation::{ContractId, DomainError, Timestamp, UserId};

/// Repository port for Contract aggregate persistence.
#[async_trait]
pub trait ContractRepository: Send + Sync {
    /// Inserts a new pending contract unless the pair already has an open one.
    ///
    /// # Errors
    ///
    /// - `DuplicateEngagement` (details `client_id`, `nutritionist_id`) when an
    ///   open contract exists, including one inserted concurrently
    /// - `DatabaseError` on persistence failure
    async fn insert_pending(&self, contract: &Contract) -> Result<(), DomainError>;

    /// Writes `contract` if the stored row still has status `expected` and the
    /// same `version`. The stored version is incremented.
    ///
    /// # Errors
    ///
    /// - `ContractNotFound` if the row does not exist
    /// - `ConcurrentModification` if status or version moved underneath
    /// - `DatabaseError` on persistence failure
    async fn update(&self, contract: &Contract, expected: ContractStatus)
        -> Result<(), DomainError>;

    /// Removes a pending contract that never received an authorization.
    ///
    /// Compensation for a failed gateway call during initiation. A no-op when
    /// the contract is gone or already authorized.
    async fn discard_unauthorized(&self, id: &ContractId) -> Result<(), DomainError>;

    async fn find_by_id(&self, id: &ContractId) -> Result<Option<Contract>, DomainError>;

    async fn find_by_authorization_id(
        &self,
        authorization_id: &str,
    ) -> Result<Option<Contract>, DomainError>;

    /// All contracts where `party` is client or nutritionist, newest first.
    async fn find_for_party(&self, party: &UserId) -> Result<Vec<Contract>, DomainError>;

    /// Contracts for the (client, nutritionist) pair in any of `statuses`.
    /// An empty slice matches every status.
    async fn find_between(
        &self,
        client_id: &UserId,
        nutritionist_id: &UserId,
        statuses: &[ContractStatus],
    ) -> Result<Vec<Contract>, DomainError>;

    /// A nutritionist's contracts in any of `statuses`, newest first.
    async fn find_by_nutritionist(
        &self,
        nutritionist_id: &UserId,
        statuses: &[ContractStatus],
    ) -> Result<Vec<Contract>, DomainError>;

    /// Active contracts with `ends_at <= now`.
    async fn find_due_for_completion(&self, now: Timestamp) -> Result<Vec<Contract>, DomainError>;

    /// Pending contracts created before `cutoff`.
    async fn find_pending_created_before(
        &self,
        cutoff: Timestamp,
    ) -> Result<Vec<Contract>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contract_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn ContractRepository) {}
    }
}
