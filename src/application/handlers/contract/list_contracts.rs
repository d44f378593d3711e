//! ListContractsHandler - Query handler for a party's contracts.

use std::sync::Arc;

use serde::Serialize;

use crate::domain::contract::Contract;
use crate::domain::engagement::{display_name_or_unknown, EngagementError};
use crate::domain::foundation::UserId;
use crate::ports::{ContractRepository, PartyDirectory};

/// Query for every contract a user takes part in.
#[derive(Debug, Clone)]
pub struct ListContractsQuery {
    pub party_id: UserId,
}

/// A contract seen from one of its parties.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContractSummary {
    pub contract: Contract,
    pub counterpart_id: UserId,
    /// `"Unknown"` when the directory has no name for the counterpart.
    pub counterpart_name: String,
}

/// Handler for listing contracts.
pub struct ListContractsHandler {
    contracts: Arc<dyn ContractRepository>,
    parties: Arc<dyn PartyDirectory>,
}

impl ListContractsHandler {
    pub fn new(contracts: Arc<dyn ContractRepository>, parties: Arc<dyn PartyDirectory>) -> Self {
        Self { contracts, parties }
    }

    pub async fn handle(
        &self,
        query: ListContractsQuery,
    ) -> Result<Vec<ContractSummary>, EngagementError> {
        let contracts = self.contracts.find_for_party(&query.party_id).await?;
        summarize(self.parties.as_ref(), &query.party_id, contracts).await
    }
}

/// Annotates each contract with the name of the party other than `viewer`.
pub(crate) async fn summarize(
    parties: &dyn PartyDirectory,
    viewer: &UserId,
    contracts: Vec<Contract>,
) -> Result<Vec<ContractSummary>, EngagementError> {
    let mut counterparts: Vec<UserId> = contracts
        .iter()
        .filter_map(|c| c.counterpart_of(viewer))
        .collect();
    counterparts.sort();
    counterparts.dedup();

    let names = if counterparts.is_empty() {
        Default::default()
    } else {
        parties.display_names(&counterparts).await?
    };

    Ok(contracts
        .into_iter()
        .filter_map(|contract| {
            let counterpart_id = contract.counterpart_of(viewer)?;
            let counterpart_name =
                display_name_or_unknown(names.get(&counterpart_id).map(String::as_str));
            Some(ContractSummary {
                contract,
                counterpart_id,
                counterpart_name,
            })
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::{t0, Fixture};
    use crate::domain::contract::ContractStatus;
    use crate::domain::engagement::UNKNOWN_DISPLAY_NAME;

    #[tokio::test]
    async fn annotates_with_counterpart_name() {
        let fx = Fixture::new();
        let contract = fx.active_contract(fx.client, fx.nutritionist).await;
        let handler = ListContractsHandler::new(fx.contracts.clone(), fx.parties.clone());

        let as_client = handler
            .handle(ListContractsQuery {
                party_id: fx.client,
            })
            .await
            .unwrap();
        assert_eq!(as_client.len(), 1);
        assert_eq!(as_client[0].contract.id, contract.id);
        assert_eq!(as_client[0].counterpart_id, fx.nutritionist);
        assert_eq!(as_client[0].counterpart_name, "Dr. Lee");

        let as_nutritionist = handler
            .handle(ListContractsQuery {
                party_id: fx.nutritionist,
            })
            .await
            .unwrap();
        assert_eq!(as_nutritionist[0].counterpart_name, "Ana Client");
    }

    #[tokio::test]
    async fn missing_name_renders_unknown() {
        let fx = Fixture::new();
        let ghost = UserId::new();
        fx.pending_contract(fx.client, ghost).await;
        let handler = ListContractsHandler::new(fx.contracts.clone(), fx.parties.clone());

        let listed = handler
            .handle(ListContractsQuery {
                party_id: fx.client,
            })
            .await
            .unwrap();
        assert_eq!(listed[0].counterpart_name, UNKNOWN_DISPLAY_NAME);
    }

    #[tokio::test]
    async fn includes_terminal_contracts() {
        let fx = Fixture::new();
        let mut pending = fx.pending_contract(fx.client, fx.nutritionist).await;
        pending.cancel(&fx.client, t0(), None).unwrap();
        fx.contracts
            .update(&pending, ContractStatus::Pending)
            .await
            .unwrap();
        fx.pending_contract(fx.client, fx.nutritionist).await;

        let handler = ListContractsHandler::new(fx.contracts.clone(), fx.parties.clone());
        let listed = handler
            .handle(ListContractsQuery {
                party_id: fx.client,
            })
            .await
            .unwrap();
        assert_eq!(listed.len(), 2);
    }

    #[tokio::test]
    async fn empty_for_user_without_contracts() {
        let fx = Fixture::new();
        let handler = ListContractsHandler::new(fx.contracts.clone(), fx.parties.clone());
        let listed = handler
            .handle(ListContractsQuery {
                party_id: fx.client,
            })
            .await
            .unwrap();
        assert!(listed.is_empty());
    }
}
