//! Diet repository port.
//!
//! Persistence for `Diet` aggregates. Updates are compare-and-set on
//! (status, version); `save_renewal` is the one multi-row write in the system
//! and must apply both rows or neither.

use async_trait::async_trait;

use crate::domain::diet::{Diet, DietStatus};
use crate::domain::foundation::{DietId, DomainError, Timestamp, UserId};

/// Repository port for Diet aggregate persistence.
#[async_trait]
pub trait DietRepository: Send + Sync {
    /// Persists a new diet.
    async fn insert(&self, diet: &Diet) -> Result<(), DomainError>;

    /// Writes `diet` if the stored row still has status `expected` and the
    /// same `version`.
    ///
    /// # Errors
    ///
    /// - `DietNotFound` if the row does not exist
    /// - `ConcurrentModification` if status or version moved underneath
    /// - `DatabaseError` on persistence failure
    async fn update(&self, diet: &Diet, expected: DietStatus) -> Result<(), DomainError>;

    /// Atomically supersedes `predecessor` and inserts `successor`.
    ///
    /// The predecessor write is guarded like `update` with `expected`. On any
    /// failure nothing is persisted.
    async fn save_renewal(
        &self,
        predecessor: &Diet,
        expected: DietStatus,
        successor: &Diet,
    ) -> Result<(), DomainError>;

    async fn find_by_id(&self, id: &DietId) -> Result<Option<Diet>, DomainError>;

    /// Diets owned by `owner`, optionally filtered by status, newest first.
    async fn find_by_owner(
        &self,
        owner_id: &UserId,
        status: Option<DietStatus>,
    ) -> Result<Vec<Diet>, DomainError>;

    /// Diets stored as active whose `expires_at` is before `now`, for one
    /// owner or for everyone.
    async fn find_lapsed(
        &self,
        owner_id: Option<&UserId>,
        now: Timestamp,
    ) -> Result<Vec<Diet>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diet_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn DietRepository) {}
    }
}
