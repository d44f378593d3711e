//! Engagement policy - rules binding diets to contracts.
//!
//! These are pure predicates over already-loaded contracts. Loading the
//! contracts for a pair is the application layer's job
//! (`application::EngagementGuard`); this module only decides.
//!
//! # Rules
//!
//! - Authoring (create/renew) needs an `active` contract between nutritionist and client
//! - Reading a client's diets needs an `active` or `pending` contract
//! - Clients read only their own diets
//! - Pause/reactivate are reserved to the diet's author with an `active` contract
//! - Reassignment is governed by `ReassignmentPolicy`

use serde::{Deserialize, Serialize};

use crate::domain::contract::{Contract, ContractStatus};
use crate::domain::diet::Diet;
use crate::domain::foundation::UserId;

use super::{EngagementError, Party};

/// How strong a contract must be for an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessLevel {
    /// Viewing: pending or active contract.
    Read,
    /// Authoring or changing a diet: active contract only.
    Act,
}

impl AccessLevel {
    pub fn admits(&self, status: ContractStatus) -> bool {
        match self {
            AccessLevel::Read => status.is_open(),
            AccessLevel::Act => status == ContractStatus::Active,
        }
    }
}

/// Who may move a diet to another client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReassignmentPolicy {
    /// Owners never change after creation.
    Disabled,
    /// New owner must hold an active contract with the author.
    RequireActiveContract,
    /// New owner must hold a pending or active contract with the author.
    RequireOpenContract,
}

impl Default for ReassignmentPolicy {
    fn default() -> Self {
        ReassignmentPolicy::RequireActiveContract
    }
}

/// Configurable cross-lifecycle rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngagementPolicy {
    pub reassignment: ReassignmentPolicy,
    /// Renewing a diet needs an active contract, like creating one.
    pub require_active_contract_for_renewal: bool,
}

impl Default for EngagementPolicy {
    fn default() -> Self {
        Self {
            reassignment: ReassignmentPolicy::default(),
            require_active_contract_for_renewal: true,
        }
    }
}

impl EngagementPolicy {
    /// Guards engagement creation on the parties involved.
    ///
    /// `None` means the directory has no such user.
    pub fn check_parties(
        client_id: &UserId,
        nutritionist_id: &UserId,
        client: Option<&Party>,
        nutritionist: Option<&Party>,
    ) -> Result<(), EngagementError> {
        if client_id == nutritionist_id {
            return Err(EngagementError::invalid_party(
                "a user cannot contract with themselves",
            ));
        }
        let client = client.ok_or_else(|| EngagementError::invalid_party("unknown client"))?;
        if client.is_nutritionist() {
            return Err(EngagementError::invalid_party(
                "nutritionists cannot engage other nutritionists",
            ));
        }
        let nutritionist =
            nutritionist.ok_or_else(|| EngagementError::invalid_party("unknown nutritionist"))?;
        if !nutritionist.is_nutritionist() {
            return Err(EngagementError::invalid_party(
                "the requested professional is not a nutritionist",
            ));
        }
        if !nutritionist.verified {
            return Err(EngagementError::invalid_party(
                "the nutritionist has not been verified",
            ));
        }
        Ok(())
    }

    /// First contract binding the pair at the given level, if any.
    pub fn find_engagement<'a>(
        contracts: &'a [Contract],
        nutritionist_id: &UserId,
        client_id: &UserId,
        level: AccessLevel,
    ) -> Option<&'a Contract> {
        contracts
            .iter()
            .find(|c| c.binds(nutritionist_id, client_id) && level.admits(c.status))
    }

    pub fn require_engagement<'a>(
        contracts: &'a [Contract],
        nutritionist_id: &UserId,
        client_id: &UserId,
        level: AccessLevel,
    ) -> Result<&'a Contract, EngagementError> {
        Self::find_engagement(contracts, nutritionist_id, client_id, level)
            .ok_or_else(|| EngagementError::no_active_engagement(*client_id, *nutritionist_id))
    }

    /// Creating a diet: active contract required.
    pub fn authorize_authoring<'a>(
        &self,
        contracts: &'a [Contract],
        nutritionist_id: &UserId,
        client_id: &UserId,
    ) -> Result<&'a Contract, EngagementError> {
        Self::require_engagement(contracts, nutritionist_id, client_id, AccessLevel::Act)
    }

    /// Renewing a diet: like authoring unless the policy relaxes it.
    ///
    /// Returns the governing active contract when one exists.
    pub fn authorize_renewal<'a>(
        &self,
        contracts: &'a [Contract],
        nutritionist_id: &UserId,
        client_id: &UserId,
    ) -> Result<Option<&'a Contract>, EngagementError> {
        if self.require_active_contract_for_renewal {
            return self
                .authorize_authoring(contracts, nutritionist_id, client_id)
                .map(Some);
        }
        Self::require_engagement(contracts, nutritionist_id, client_id, AccessLevel::Read)?;
        Ok(Self::find_engagement(
            contracts,
            nutritionist_id,
            client_id,
            AccessLevel::Act,
        ))
    }

    /// Viewing a diet. `contracts` are the requester's contracts with the owner.
    pub fn authorize_diet_view(
        diet: &Diet,
        requester: &UserId,
        contracts: &[Contract],
    ) -> Result<(), EngagementError> {
        if &diet.owner_id == requester {
            return Ok(());
        }
        if Self::find_engagement(contracts, requester, &diet.owner_id, AccessLevel::Read).is_some()
        {
            return Ok(());
        }
        Err(EngagementError::forbidden(
            "diet belongs to a client you are not engaged with",
        ))
    }

    /// Listing a client's diets, before any diet is loaded.
    pub fn authorize_owner_listing(
        owner_id: &UserId,
        requester: &UserId,
        contracts: &[Contract],
    ) -> Result<(), EngagementError> {
        if owner_id == requester
            || Self::find_engagement(contracts, requester, owner_id, AccessLevel::Read).is_some()
        {
            Ok(())
        } else {
            Err(EngagementError::forbidden(
                "diets of clients you are not engaged with are private",
            ))
        }
    }

    /// Pausing or reactivating: the author, with an active contract.
    pub fn authorize_diet_action(
        diet: &Diet,
        requester: &UserId,
        contracts: &[Contract],
    ) -> Result<(), EngagementError> {
        if &diet.nutritionist_id != requester {
            return Err(EngagementError::forbidden(
                "only the authoring nutritionist can change this diet",
            ));
        }
        Self::require_engagement(contracts, requester, &diet.owner_id, AccessLevel::Act)?;
        Ok(())
    }

    /// Reassigning a diet. `new_owner_contracts` are the author's contracts
    /// with the prospective owner.
    pub fn authorize_reassignment(
        &self,
        diet: &Diet,
        requester: &UserId,
        new_owner: &UserId,
        new_owner_contracts: &[Contract],
    ) -> Result<(), EngagementError> {
        let level = match self.reassignment {
            ReassignmentPolicy::Disabled => {
                return Err(EngagementError::forbidden("diet reassignment is disabled"));
            }
            ReassignmentPolicy::RequireActiveContract => AccessLevel::Act,
            ReassignmentPolicy::RequireOpenContract => AccessLevel::Read,
        };
        if &diet.nutritionist_id != requester {
            return Err(EngagementError::forbidden(
                "only the authoring nutritionist can reassign this diet",
            ));
        }
        Self::require_engagement(new_owner_contracts, &diet.nutritionist_id, new_owner, level)?;
        Ok(())
    }
}
