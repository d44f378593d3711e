//! CompleteContractsHandler - Command handler for closing elapsed contracts.
//!
//! Invoked by an external scheduler. Each contract is moved with its own
//! compare-and-set, so overlapping runs complete a contract only once.

use std::sync::Arc;

use crate::application::publish_after_commit;
use crate::domain::contract::{Contract, ContractEvent, ContractStatus};
use crate::domain::engagement::EngagementError;
use crate::ports::{Clock, ContractRepository, EventPublisher};

/// Command to complete every active contract whose period has ended.
#[derive(Debug, Clone, Default)]
pub struct CompleteContractsCommand;

#[derive(Debug, Clone, Default)]
pub struct CompleteContractsResult {
    /// Contracts completed by this run.
    pub completed: Vec<Contract>,
}

pub struct CompleteContractsHandler {
    contracts: Arc<dyn ContractRepository>,
    event_publisher: Arc<dyn EventPublisher>,
    clock: Arc<dyn Clock>,
}

impl CompleteContractsHandler {
    pub fn new(
        contracts: Arc<dyn ContractRepository>,
        event_publisher: Arc<dyn EventPublisher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            contracts,
            event_publisher,
            clock,
        }
    }

    pub async fn handle(
        &self,
        _cmd: CompleteContractsCommand,
    ) -> Result<CompleteContractsResult, EngagementError> {
        let now = self.clock.now();
        let due = self.contracts.find_due_for_completion(now).await?;
        let mut completed = Vec::with_capacity(due.len());

        for mut contract in due {
            contract.complete(now)?;
            match self.contracts.update(&contract, ContractStatus::Active).await {
                Ok(()) => contract.version += 1,
                Err(e) => match EngagementError::from(e) {
                    // Someone else moved it first.
                    EngagementError::InvalidState { .. } | EngagementError::NotFound { .. } => {
                        tracing::debug!(contract_id = %contract.id, "Contract changed concurrently, skipping");
                        continue;
                    }
                    other => return Err(other),
                },
            }

            tracing::info!(contract_id = %contract.id, "Contract completed");
            let event = ContractEvent::Completed {
                contract_id: contract.id,
                client_id: contract.client_id,
                nutritionist_id: contract.nutritionist_id,
                occurred_at: now,
            };
            publish_after_commit(self.event_publisher.as_ref(), event.to_envelope()).await;
            completed.push(contract);
        }

        Ok(CompleteContractsResult { completed })
    }
}
