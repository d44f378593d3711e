//! ReconcileContractHandler - Command handler for applying a confirmed payment.
//!
//! Shared by the client-driven confirmation call and the payment webhook.
//! Running it again for an already active contract changes nothing.

use std::sync::Arc;

use crate::application::publish_after_commit;
use crate::domain::contract::{Activation, Contract, ContractEvent, ContractStatus};
use crate::domain::engagement::EngagementError;
use crate::ports::{AuthorizationStatus, Clock, ContractRepository, EventPublisher, PaymentGateway};

/// Command to reconcile a contract with its payment authorization.
#[derive(Debug, Clone)]
pub struct ReconcileContractCommand {
    pub authorization_id: String,
}

/// Result of reconciliation.
#[derive(Debug, Clone)]
pub struct ReconcileContractResult {
    pub contract: Contract,
    pub outcome: Activation,
}

/// Handler for reconciling payments.
pub struct ReconcileContractHandler {
    contracts: Arc<dyn ContractRepository>,
    gateway: Arc<dyn PaymentGateway>,
    event_publisher: Arc<dyn EventPublisher>,
    clock: Arc<dyn Clock>,
}

impl ReconcileContractHandler {
    pub fn new(
        contracts: Arc<dyn ContractRepository>,
        gateway: Arc<dyn PaymentGateway>,
        event_publisher: Arc<dyn EventPublisher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            contracts,
            gateway,
            event_publisher,
            clock,
        }
    }

    pub async fn handle(
        &self,
        cmd: ReconcileContractCommand,
    ) -> Result<ReconcileContractResult, EngagementError> {
        // 1. Find the contract owning the authorization
        let mut contract = self
            .contracts
            .find_by_authorization_id(&cmd.authorization_id)
            .await?
            .ok_or_else(|| EngagementError::not_found("contract", &cmd.authorization_id))?;

        // 2. Nothing to do once active
        if contract.status == ContractStatus::Active {
            tracing::debug!(contract_id = %contract.id, "Contract already active");
            return Ok(ReconcileContractResult {
                contract,
                outcome: Activation::AlreadyActive,
            });
        }
        if contract.status != ContractStatus::Pending {
            return Err(EngagementError::invalid_state(
                contract.status.as_str(),
                "activate",
            ));
        }

        // 3. Ask the gateway
        let status = self
            .gateway
            .get_status(&cmd.authorization_id)
            .await?;
        if status != AuthorizationStatus::Succeeded {
            tracing::info!(
                contract_id = %contract.id,
                authorization_id = %cmd.authorization_id,
                status = status.as_str(),
                "Payment not yet succeeded"
            );
            return Err(EngagementError::payment_not_succeeded(
                cmd.authorization_id,
                status.as_str(),
            ));
        }

        // 4. Activate with compare-and-set
        let now = self.clock.now();
        contract.activate(&cmd.authorization_id, now)?;
        if let Err(e) = self.contracts.update(&contract, ContractStatus::Pending).await {
            return self.resolve_conflict(&cmd.authorization_id, e.into()).await;
        }
        contract.version += 1;

        tracing::info!(
            contract_id = %contract.id,
            client_id = %contract.client_id,
            nutritionist_id = %contract.nutritionist_id,
            "Contract activated"
        );

        // 5. Publish
        if let (Some(starts_at), Some(ends_at)) = (contract.starts_at, contract.ends_at) {
            let event = ContractEvent::Activated {
                contract_id: contract.id,
                client_id: contract.client_id,
                nutritionist_id: contract.nutritionist_id,
                starts_at,
                ends_at,
                occurred_at: now,
            };
            publish_after_commit(self.event_publisher.as_ref(), event.to_envelope()).await;
        }

        Ok(ReconcileContractResult {
            contract,
            outcome: Activation::Activated,
        })
    }

    /// A concurrent reconcile may have won the race; that still counts as success.
    async fn resolve_conflict(
        &self,
        authorization_id: &str,
        err: EngagementError,
    ) -> Result<ReconcileContractResult, EngagementError> {
        if !matches!(err, EngagementError::InvalidState { .. }) {
            return Err(err);
        }
        match self.contracts.find_by_authorization_id(authorization_id).await? {
            Some(current) if current.status == ContractStatus::Active => {
                Ok(ReconcileContractResult {
                    contract: current,
                    outcome: Activation::AlreadyActive,
                })
            }
            _ => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::{t0, Fixture};
    use crate::ports::PaymentError;

    fn handler(fx: &Fixture) -> ReconcileContractHandler {
        ReconcileContractHandler::new(
            fx.contracts.clone(),
            fx.gateway.clone(),
            fx.events.clone(),
            fx.clock.clone(),
        )
    }

    fn command(contract: &Contract) -> ReconcileContractCommand {
        ReconcileContractCommand {
            authorization_id: contract.payment_authorization_id.clone().unwrap(),
        }
    }

    #[tokio::test]
    async fn activates_when_payment_succeeded() {
        let fx = Fixture::new();
        let pending = fx.pending_contract(fx.client, fx.nutritionist).await;
        fx.gateway
            .set_status(pending.payment_authorization_id.as_deref().unwrap(), AuthorizationStatus::Succeeded);
        fx.clock.advance_hours(1);

        let result = handler(&fx).handle(command(&pending)).await.unwrap();

        assert_eq!(result.outcome, Activation::Activated);
        assert_eq!(result.contract.status, ContractStatus::Active);
        assert!(result.contract.validated);
        let starts_at = t0().add_hours(1);
        assert_eq!(result.contract.starts_at, Some(starts_at));
        assert_eq!(result.contract.ends_at, Some(starts_at.add_days(30)));
        assert!(fx.events.has_event("contract.activated.v1"));
    }

    #[tokio::test]
    async fn second_reconcile_is_a_no_op() {
        let fx = Fixture::new();
        let pending = fx.pending_contract(fx.client, fx.nutritionist).await;
        fx.gateway
            .set_status(pending.payment_authorization_id.as_deref().unwrap(), AuthorizationStatus::Succeeded);
        let handler = handler(&fx);

        let first = handler.handle(command(&pending)).await.unwrap();
        fx.clock.advance_days(2);
        let second = handler.handle(command(&pending)).await.unwrap();

        assert_eq!(second.outcome, Activation::AlreadyActive);
        assert_eq!(second.contract.starts_at, first.contract.starts_at);
        assert_eq!(second.contract.ends_at, first.contract.ends_at);
        assert_eq!(fx.events.events_of_type("contract.activated.v1").len(), 1);
        assert_eq!(fx.gateway.call_count("get_status"), 1);
    }

    #[tokio::test]
    async fn pending_payment_keeps_contract_pending() {
        let fx = Fixture::new();
        let pending = fx.pending_contract(fx.client, fx.nutritionist).await;
        fx.gateway
            .set_status(pending.payment_authorization_id.as_deref().unwrap(), AuthorizationStatus::Pending);

        let err = handler(&fx).handle(command(&pending)).await.unwrap_err();

        assert!(matches!(err, EngagementError::PaymentNotSucceeded { ref status, .. } if status == "pending"));
        let stored = fx.contracts.find_by_id(&pending.id).await.unwrap().unwrap();
        assert_eq!(stored.status, ContractStatus::Pending);
    }

    #[tokio::test]
    async fn unknown_authorization_is_not_found() {
        let fx = Fixture::new();
        let err = handler(&fx)
            .handle(ReconcileContractCommand {
                authorization_id: "pi_unknown".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, EngagementError::NotFound { resource: "contract", .. }));
    }

    #[tokio::test]
    async fn gateway_outage_is_retryable() {
        let fx = Fixture::new();
        let pending = fx.pending_contract(fx.client, fx.nutritionist).await;
        fx.gateway
            .set_error("get_status", PaymentError::timeout("gateway timed out"));

        let err = handler(&fx).handle(command(&pending)).await.unwrap_err();

        assert!(matches!(err, EngagementError::GatewayUnavailable(_)));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn cancelled_contract_cannot_be_activated() {
        let fx = Fixture::new();
        let mut pending = fx.pending_contract(fx.client, fx.nutritionist).await;
        pending.cancel(&fx.client, t0(), None).unwrap();
        fx.contracts
            .update(&pending, ContractStatus::Pending)
            .await
            .unwrap();
        fx.gateway
            .set_status(pending.payment_authorization_id.as_deref().unwrap(), AuthorizationStatus::Succeeded);

        let err = handler(&fx).handle(command(&pending)).await.unwrap_err();
        assert!(matches!(err, EngagementError::InvalidState { .. }));
    }
}
