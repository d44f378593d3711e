//! ListClientsHandler - Query handler for a nutritionist's current clients.

use std::sync::Arc;

use serde::Serialize;

use crate::domain::contract::{Contract, ContractStatus};
use crate::domain::engagement::{display_name_or_unknown, EngagementError};
use crate::domain::foundation::{ContractId, UserId};
use crate::ports::{ContractRepository, PartyDirectory};

#[derive(Debug, Clone)]
pub struct ListClientsQuery {
    pub nutritionist_id: UserId,
}

/// A client served through a pending or active contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientSummary {
    pub client_id: UserId,
    pub display_name: String,
    pub contract_id: ContractId,
    pub contract_status: ContractStatus,
}

pub struct ListClientsHandler {
    contracts: Arc<dyn ContractRepository>,
    parties: Arc<dyn PartyDirectory>,
}

impl ListClientsHandler {
    pub fn new(contracts: Arc<dyn ContractRepository>, parties: Arc<dyn PartyDirectory>) -> Self {
        Self { contracts, parties }
    }

    pub async fn handle(&self, query: ListClientsQuery) -> Result<Vec<ClientSummary>, EngagementError> {
        let contracts: Vec<Contract> = self
            .contracts
            .find_by_nutritionist(
                &query.nutritionist_id,
                &[ContractStatus::Pending, ContractStatus::Active],
            )
            .await?;
        if contracts.is_empty() {
            return Ok(Vec::new());
        }

        let client_ids: Vec<UserId> = contracts.iter().map(|c| c.client_id).collect();
        let names = self.parties.display_names(&client_ids).await?;

        Ok(contracts
            .into_iter()
            .map(|c| ClientSummary {
                client_id: c.client_id,
                display_name: display_name_or_unknown(names.get(&c.client_id).map(String::as_str)),
                contract_id: c.id,
                contract_status: c.status,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::{t0, Fixture};

    #[tokio::test]
    async fn lists_pending_and_active_clients_only() {
        let fx = Fixture::new();
        fx.active_contract(fx.client, fx.nutritionist).await;
        let prospect = fx.add_client("Bo").await;
        fx.pending_contract(prospect, fx.nutritionist).await;
        let former = fx.add_client("Cy").await;
        let mut gone = fx.pending_contract(former, fx.nutritionist).await;
        gone.cancel(&former, t0(), None).unwrap();
        fx.contracts
            .update(&gone, ContractStatus::Pending)
            .await
            .unwrap();

        let handler = ListClientsHandler::new(fx.contracts.clone(), fx.parties.clone());
        let mut clients = handler
            .handle(ListClientsQuery {
                nutritionist_id: fx.nutritionist,
            })
            .await
            .unwrap();
        clients.sort_by(|a, b| a.display_name.cmp(&b.display_name));

        let names: Vec<&str> = clients.iter().map(|c| c.display_name.as_str()).collect();
        assert_eq!(names, vec!["Ana Client", "Bo"]);
        assert_eq!(clients[0].contract_status, ContractStatus::Active);
        assert_eq!(clients[1].contract_status, ContractStatus::Pending);
    }

    #[tokio::test]
    async fn no_clients_skips_directory() {
        let fx = Fixture::new();
        let handler = ListClientsHandler::new(fx.contracts.clone(), fx.parties.clone());
        let clients = handler
            .handle(ListClientsQuery {
                nutritionist_id: fx.nutritionist,
            })
            .await
            .unwrap();
        assert!(clients.is_empty());
    }
}
