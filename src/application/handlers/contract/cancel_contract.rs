//! CancelContractHandler - Command handler for withdrawing from a contract.

use std::sync::Arc;

use chrono::Duration;

use crate::application::publish_after_commit;
use crate::domain::contract::{Contract, ContractEvent, ContractStatus};
use crate::domain::engagement::EngagementError;
use crate::domain::foundation::{ContractId, UserId};
use crate::ports::{Clock, ContractRepository, EventPublisher};

/// Command to cancel a contract.
#[derive(Debug, Clone)]
pub struct CancelContractCommand {
    pub contract_id: ContractId,
    pub requester_id: UserId,
}

/// Result of a cancellation.
#[derive(Debug, Clone)]
pub struct CancelContractResult {
    pub contract: Contract,
    /// The contract had been paid for.
    pub was_active: bool,
}

/// Handler for cancelling contracts.
pub struct CancelContractHandler {
    contracts: Arc<dyn ContractRepository>,
    event_publisher: Arc<dyn EventPublisher>,
    clock: Arc<dyn Clock>,
    /// How long after activation the client may still cancel. `None` = always.
    window: Option<Duration>,
}

impl CancelContractHandler {
    pub fn new(
        contracts: Arc<dyn ContractRepository>,
        event_publisher: Arc<dyn EventPublisher>,
        clock: Arc<dyn Clock>,
        window: Option<Duration>,
    ) -> Self {
        Self {
            contracts,
            event_publisher,
            clock,
            window,
        }
    }

    pub async fn handle(
        &self,
        cmd: CancelContractCommand,
    ) -> Result<CancelContractResult, EngagementError> {
        // 1. Find contract
        let mut contract = self
            .contracts
            .find_by_id(&cmd.contract_id)
            .await?
            .ok_or_else(|| EngagementError::not_found("contract", cmd.contract_id))?;

        // 2. Apply the transition
        let now = self.clock.now();
        let expected = contract.status;
        contract.cancel(&cmd.requester_id, now, self.window)?;

        // 3. Persist
        self.contracts.update(&contract, expected).await?;
        contract.version += 1;

        let was_active = expected == ContractStatus::Active;
        tracing::info!(
            contract_id = %contract.id,
            client_id = %contract.client_id,
            was_active,
            "Contract cancelled"
        );

        // 4. Publish
        let event = ContractEvent::Cancelled {
            contract_id: contract.id,
            client_id: contract.client_id,
            nutritionist_id: contract.nutritionist_id,
            was_active,
            occurred_at: now,
        };
        publish_after_commit(
            self.event_publisher.as_ref(),
            event.to_envelope().with_user_id(cmd.requester_id.to_string()),
        )
        .await;

        Ok(CancelContractResult {
            contract,
            was_active,
        })
    }
}
