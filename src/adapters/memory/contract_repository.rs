//! In-memory contract repository.
//!
//! A single write lock covers check-and-insert, which gives the same
//! atomicity as the partial unique index in PostgreSQL.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::contract::{Contract, ContractStatus};
use crate::domain::foundation::{ContractId, DomainError, ErrorCode, Timestamp, UserId};
use crate::ports::ContractRepository;

/// In-memory storage for contracts, for tests and local runs.
#[derive(Debug, Clone, Default)]
pub struct InMemoryContractRepository {
    contracts: Arc<RwLock<HashMap<ContractId, Contract>>>,
    fail_writes: Arc<AtomicBool>,
}

impl InMemoryContractRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent write fail with `DatabaseError`.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub async fn len(&self) -> usize {
        self.contracts.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.contracts.read().await.is_empty()
    }

    fn check_writable(&self) -> Result<(), DomainError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(DomainError::database("contract store unavailable"));
        }
        Ok(())
    }
}

fn newest_first(mut contracts: Vec<Contract>) -> Vec<Contract> {
    contracts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    contracts
}

fn status_matches(statuses: &[ContractStatus], status: ContractStatus) -> bool {
    statuses.is_empty() || statuses.contains(&status)
}

#[async_trait]
impl ContractRepository for InMemoryContractRepository {
    async fn insert_pending(&self, contract: &Contract) -> Result<(), DomainError> {
        self.check_writable()?;
        let mut contracts = self.contracts.write().await;

        let conflict = contracts.values().any(|c| {
            c.client_id == contract.client_id
                && c.nutritionist_id == contract.nutritionist_id
                && c.is_open()
        });
        if conflict {
            return Err(DomainError::new(
                ErrorCode::DuplicateEngagement,
                "An open contract already exists for this pair",
            )
            .with_detail("client_id", contract.client_id.to_string())
            .with_detail("nutritionist_id", contract.nutritionist_id.to_string()));
        }

        contracts.insert(contract.id, contract.clone());
        Ok(())
    }

    async fn update(
        &self,
        contract: &Contract,
        expected: ContractStatus,
    ) -> Result<(), DomainError> {
        self.check_writable()?;
        let mut contracts = self.contracts.write().await;

        if let Some(auth_id) = contract.payment_authorization_id.as_deref() {
            let taken = contracts.values().any(|c| {
                c.id != contract.id && c.payment_authorization_id.as_deref() == Some(auth_id)
            });
            if taken {
                return Err(DomainError::new(
                    ErrorCode::InvalidStateTransition,
                    "Payment authorization is linked to another contract",
                )
                .with_detail("current", "authorization in use")
                .with_detail("attempted", "attach a payment authorization"));
            }
        }

        let stored = contracts.get_mut(&contract.id).ok_or_else(|| {
            DomainError::new(ErrorCode::ContractNotFound, "Contract not found")
                .with_detail("id", contract.id.to_string())
        })?;
        if stored.status != expected || stored.version != contract.version {
            return Err(DomainError::new(
                ErrorCode::ConcurrentModification,
                "Contract was modified concurrently",
            )
            .with_detail("current", stored.status.as_str())
            .with_detail("attempted", format!("write from {}", expected)));
        }

        let mut updated = contract.clone();
        updated.version += 1;
        *stored = updated;
        Ok(())
    }

    async fn discard_unauthorized(&self, id: &ContractId) -> Result<(), DomainError> {
        self.check_writable()?;
        let mut contracts = self.contracts.write().await;
        let discardable = contracts.get(id).map_or(false, |c| {
            c.status == ContractStatus::Pending && c.payment_authorization_id.is_none()
        });
        if discardable {
            contracts.remove(id);
        }
        Ok(())
    }

    async fn find_by_id(&self, id: &ContractId) -> Result<Option<Contract>, DomainError> {
        Ok(self.contracts.read().await.get(id).cloned())
    }

    async fn find_by_authorization_id(
        &self,
        authorization_id: &str,
    ) -> Result<Option<Contract>, DomainError> {
        let contracts = self.contracts.read().await;
        Ok(contracts
            .values()
            .find(|c| c.payment_authorization_id.as_deref() == Some(authorization_id))
            .cloned())
    }

    async fn find_for_party(&self, party: &UserId) -> Result<Vec<Contract>, DomainError> {
        let contracts = self.contracts.read().await;
        Ok(newest_first(
            contracts.values().filter(|c| c.is_party(party)).cloned().collect(),
        ))
    }

    async fn find_between(
        &self,
        client_id: &UserId,
        nutritionist_id: &UserId,
        statuses: &[ContractStatus],
    ) -> Result<Vec<Contract>, DomainError> {
        let contracts = self.contracts.read().await;
        Ok(newest_first(
            contracts
                .values()
                .filter(|c| c.binds(nutritionist_id, client_id) && status_matches(statuses, c.status))
                .cloned()
                .collect(),
        ))
    }

    async fn find_by_nutritionist(
        &self,
        nutritionist_id: &UserId,
        statuses: &[ContractStatus],
    ) -> Result<Vec<Contract>, DomainError> {
        let contracts = self.contracts.read().await;
        Ok(newest_first(
            contracts
                .values()
                .filter(|c| &c.nutritionist_id == nutritionist_id && status_matches(statuses, c.status))
                .cloned()
                .collect(),
        ))
    }

    async fn find_due_for_completion(&self, now: Timestamp) -> Result<Vec<Contract>, DomainError> {
        let contracts = self.contracts.read().await;
        Ok(contracts
            .values()
            .filter(|c| c.is_due_for_completion(now))
            .cloned()
            .collect())
    }

    async fn find_pending_created_before(
        &self,
        cutoff: Timestamp,
    ) -> Result<Vec<Contract>, DomainError> {
        let contracts = self.contracts.read().await;
        Ok(contracts
            .values()
            .filter(|c| c.status == ContractStatus::Pending && c.created_at.is_before(&cutoff))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::contract::{ContractTerms, TermsLimits};

    fn contract(client: UserId, nutritionist: UserId) -> Contract {
        let terms = ContractTerms::new(
            5_000,
            "usd",
            1,
            "Thirty days of coaching",
            &TermsLimits::default(),
        )
        .unwrap();
        Contract::initiate(ContractId::new(), client, nutritionist, terms, Timestamp::now()).unwrap()
    }

    #[tokio::test]
    async fn second_open_contract_for_pair_is_rejected() {
        let repo = InMemoryContractRepository::new();
        let (client, nutritionist) = (UserId::new(), UserId::new());

        repo.insert_pending(&contract(client, nutritionist)).await.unwrap();
        let err = repo
            .insert_pending(&contract(client, nutritionist))
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::DuplicateEngagement);
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test]
    async fn concurrent_inserts_admit_exactly_one() {
        let repo = InMemoryContractRepository::new();
        let (client, nutritionist) = (UserId::new(), UserId::new());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let repo = repo.clone();
                tokio::spawn(async move { repo.insert_pending(&contract(client, nutritionist)).await })
            })
            .collect();

        let mut successes = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                successes += 1;
            }
        }
        assert_eq!(successes, 1);
    }

    #[tokio::test]
    async fn terminal_contract_does_not_block_new_one() {
        let repo = InMemoryContractRepository::new();
        let (client, nutritionist) = (UserId::new(), UserId::new());
        let mut first = contract(client, nutritionist);
        repo.insert_pending(&first).await.unwrap();

        first.cancel(&client, Timestamp::now(), None).unwrap();
        repo.update(&first, ContractStatus::Pending).await.unwrap();

        assert!(repo.insert_pending(&contract(client, nutritionist)).await.is_ok());
    }

    #[tokio::test]
    async fn stale_version_is_rejected() {
        let repo = InMemoryContractRepository::new();
        let original = contract(UserId::new(), UserId::new());
        repo.insert_pending(&original).await.unwrap();

        let mut first = original.clone();
        first.attach_authorization("pi_1", Timestamp::now()).unwrap();
        repo.update(&first, ContractStatus::Pending).await.unwrap();

        let mut second = original.clone();
        second.attach_authorization("pi_2", Timestamp::now()).unwrap();
        let err = repo.update(&second, ContractStatus::Pending).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ConcurrentModification);

        let stored = repo.find_by_id(&original.id).await.unwrap().unwrap();
        assert_eq!(stored.payment_authorization_id.as_deref(), Some("pi_1"));
        assert_eq!(stored.version, 2);
    }

    #[tokio::test]
    async fn discard_only_removes_unauthorized_pending() {
        let repo = InMemoryContractRepository::new();
        let mut authorized = contract(UserId::new(), UserId::new());
        let bare = contract(UserId::new(), UserId::new());
        repo.insert_pending(&authorized).await.unwrap();
        repo.insert_pending(&bare).await.unwrap();
        authorized.attach_authorization("pi_x", Timestamp::now()).unwrap();
        repo.update(&authorized, ContractStatus::Pending).await.unwrap();

        repo.discard_unauthorized(&authorized.id).await.unwrap();
        repo.discard_unauthorized(&bare.id).await.unwrap();

        assert!(repo.find_by_id(&authorized.id).await.unwrap().is_some());
        assert!(repo.find_by_id(&bare.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn failing_writes_report_database_error() {
        let repo = InMemoryContractRepository::new();
        repo.set_fail_writes(true);
        let err = repo
            .insert_pending(&contract(UserId::new(), UserId::new()))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::DatabaseError);
    }
}
