//! GetContractHandler - Query handler for a single contract.

use std::sync::Arc;

use crate::domain::engagement::EngagementError;
use crate::domain::foundation::{ContractId, UserId};
use crate::ports::{ContractRepository, PartyDirectory};

use super::list_contracts::{summarize, ContractSummary};

/// Query for one contract, visible to its two parties only.
#[derive(Debug, Clone)]
pub struct GetContractQuery {
    pub contract_id: ContractId,
    pub requester_id: UserId,
}

pub struct GetContractHandler {
    contracts: Arc<dyn ContractRepository>,
    parties: Arc<dyn PartyDirectory>,
}

impl GetContractHandler {
    pub fn new(contracts: Arc<dyn ContractRepository>, parties: Arc<dyn PartyDirectory>) -> Self {
        Self { contracts, parties }
    }

    pub async fn handle(&self, query: GetContractQuery) -> Result<ContractSummary, EngagementError> {
        let contract = self
            .contracts
            .find_by_id(&query.contract_id)
            .await?
            .ok_or_else(|| EngagementError::not_found("contract", query.contract_id))?;

        if !contract.is_party(&query.requester_id) {
            return Err(EngagementError::forbidden(
                "only the parties of a contract can view it",
            ));
        }

        summarize(self.parties.as_ref(), &query.requester_id, vec![contract])
            .await?
            .pop()
            .ok_or_else(|| EngagementError::not_found("contract", query.contract_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::Fixture;

    #[tokio::test]
    async fn party_sees_contract_with_counterpart() {
        let fx = Fixture::new();
        let contract = fx.active_contract(fx.client, fx.nutritionist).await;
        let handler = GetContractHandler::new(fx.contracts.clone(), fx.parties.clone());

        let summary = handler
            .handle(GetContractQuery {
                contract_id: contract.id,
                requester_id: fx.nutritionist,
            })
            .await
            .unwrap();

        assert_eq!(summary.contract, contract);
        assert_eq!(summary.counterpart_name, "Ana Client");
    }

    #[tokio::test]
    async fn outsider_is_forbidden() {
        let fx = Fixture::new();
        let contract = fx.pending_contract(fx.client, fx.nutritionist).await;
        let handler = GetContractHandler::new(fx.contracts.clone(), fx.parties.clone());

        let err = handler
            .handle(GetContractQuery {
                contract_id: contract.id,
                requester_id: UserId::new(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, EngagementError::Forbidden(_)));
    }

    #[tokio::test]
    async fn unknown_contract_is_not_found() {
        let fx = Fixture::new();
        let handler = GetContractHandler::new(fx.contracts.clone(), fx.parties.clone());

        let err = handler
            .handle(GetContractQuery {
                contract_id: ContractId::new(),
                requester_id: fx.client,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, EngagementError::NotFound { resource: "contract", .. }));
    }
}
