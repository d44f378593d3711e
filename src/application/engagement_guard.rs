//! Loads the contracts a policy decision needs and applies `EngagementPolicy`.

use std::sync::Arc;

use crate::domain::contract::{Contract, ContractStatus};
use crate::domain::diet::Diet;
use crate::domain::engagement::{EngagementError, EngagementPolicy};
use crate::domain::foundation::UserId;
use crate::ports::ContractRepository;

const OPEN_STATUSES: &[ContractStatus] = &[ContractStatus::Pending, ContractStatus::Active];

/// Engagement checks backed by the contract store.
#[derive(Clone)]
pub struct EngagementGuard {
    contracts: Arc<dyn ContractRepository>,
    policy: EngagementPolicy,
}

impl EngagementGuard {
    pub fn new(contracts: Arc<dyn ContractRepository>, policy: EngagementPolicy) -> Self {
        Self { contracts, policy }
    }

    pub fn policy(&self) -> &EngagementPolicy {
        &self.policy
    }

    async fn open_contracts(
        &self,
        nutritionist_id: &UserId,
        client_id: &UserId,
    ) -> Result<Vec<Contract>, EngagementError> {
        Ok(self
            .contracts
            .find_between(client_id, nutritionist_id, OPEN_STATUSES)
            .await?)
    }

    /// Returns the active contract that lets `nutritionist_id` author diets for `client_id`.
    pub async fn authorize_authoring(
        &self,
        nutritionist_id: &UserId,
        client_id: &UserId,
    ) -> Result<Contract, EngagementError> {
        let contracts = self.open_contracts(nutritionist_id, client_id).await?;
        self.policy
            .authorize_authoring(&contracts, nutritionist_id, client_id)
            .cloned()
    }

    /// Returns the governing active contract, if any, once renewal is allowed.
    pub async fn authorize_renewal(
        &self,
        nutritionist_id: &UserId,
        client_id: &UserId,
    ) -> Result<Option<Contract>, EngagementError> {
        let contracts = self.open_contracts(nutritionist_id, client_id).await?;
        Ok(self
            .policy
            .authorize_renewal(&contracts, nutritionist_id, client_id)?
            .cloned())
    }

    pub async fn authorize_diet_view(
        &self,
        diet: &Diet,
        requester: &UserId,
    ) -> Result<(), EngagementError> {
        if &diet.owner_id == requester {
            return Ok(());
        }
        let contracts = self.open_contracts(requester, &diet.owner_id).await?;
        EngagementPolicy::authorize_diet_view(diet, requester, &contracts)
    }

    pub async fn authorize_owner_listing(
        &self,
        owner_id: &UserId,
        requester: &UserId,
    ) -> Result<(), EngagementError> {
        if owner_id == requester {
            return Ok(());
        }
        let contracts = self.open_contracts(requester, owner_id).await?;
        EngagementPolicy::authorize_owner_listing(owner_id, requester, &contracts)
    }

    /// Pause and reactivate.
    pub async fn authorize_diet_action(
        &self,
        diet: &Diet,
        requester: &UserId,
    ) -> Result<(), EngagementError> {
        if &diet.nutritionist_id != requester {
            return EngagementPolicy::authorize_diet_action(diet, requester, &[]);
        }
        let contracts = self.open_contracts(requester, &diet.owner_id).await?;
        EngagementPolicy::authorize_diet_action(diet, requester, &contracts)
    }

    pub async fn authorize_reassignment(
        &self,
        diet: &Diet,
        requester: &UserId,
        new_owner: &UserId,
    ) -> Result<(), EngagementError> {
        let contracts = self.open_contracts(&diet.nutritionist_id, new_owner).await?;
        self.policy
            .authorize_reassignment(diet, requester, new_owner, &contracts)
    }
}
