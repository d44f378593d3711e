//! InitiateContractHandler - Command handler for starting an engagement.

use std::sync::Arc;

use crate::application::publish_after_commit;
use crate::domain::contract::{Contract, ContractEvent, ContractStatus, ContractTerms, TermsLimits};
use crate::domain::engagement::{EngagementError, EngagementPolicy};
use crate::domain::foundation::{ContractId, UserId};
use crate::ports::{
    AuthorizationMetadata, Clock, ContractRepository, CreateAuthorizationRequest, EventPublisher,
    PartyDirectory, PaymentGateway,
};

/// Command to start a paid engagement with a nutritionist.
#[derive(Debug, Clone)]
pub struct InitiateContractCommand {
    pub client_id: UserId,
    pub nutritionist_id: UserId,
    pub amount_cents: i64,
    /// Falls back to the configured default currency.
    pub currency: Option<String>,
    pub duration_months: i64,
    pub description: String,
}

/// Result of initiating a contract.
#[derive(Debug, Clone)]
pub struct InitiateContractResult {
    /// The pending contract, linked to its authorization.
    pub contract: Contract,
    pub authorization_id: String,
    /// Handed to the client so it can confirm the payment.
    pub client_secret: String,
}

/// Handler for initiating contracts.
pub struct InitiateContractHandler {
    contracts: Arc<dyn ContractRepository>,
    parties: Arc<dyn PartyDirectory>,
    gateway: Arc<dyn PaymentGateway>,
    event_publisher: Arc<dyn EventPublisher>,
    clock: Arc<dyn Clock>,
    limits: TermsLimits,
    default_currency: String,
}

impl InitiateContractHandler {
    pub fn new(
        contracts: Arc<dyn ContractRepository>,
        parties: Arc<dyn PartyDirectory>,
        gateway: Arc<dyn PaymentGateway>,
        event_publisher: Arc<dyn EventPublisher>,
        clock: Arc<dyn Clock>,
        limits: TermsLimits,
        default_currency: impl Into<String>,
    ) -> Self {
        Self {
            contracts,
            parties,
            gateway,
            event_publisher,
            clock,
            limits,
            default_currency: default_currency.into(),
        }
    }

    pub async fn handle(
        &self,
        cmd: InitiateContractCommand,
    ) -> Result<InitiateContractResult, EngagementError> {
        // 1. Validate terms before touching anything
        let currency = cmd.currency.as_deref().unwrap_or(&self.default_currency);
        let terms = ContractTerms::new(
            cmd.amount_cents,
            currency,
            cmd.duration_months,
            &cmd.description,
            &self.limits,
        )
        .map_err(|e| EngagementError::invalid_terms(e.field(), e.to_string()))?;

        // 2. Check both parties
        if cmd.client_id == cmd.nutritionist_id {
            return Err(EngagementError::invalid_party(
                "a user cannot contract with themselves",
            ));
        }
        let client = self.parties.find(&cmd.client_id).await?;
        let nutritionist = self.parties.find(&cmd.nutritionist_id).await?;
        EngagementPolicy::check_parties(
            &cmd.client_id,
            &cmd.nutritionist_id,
            client.as_ref(),
            nutritionist.as_ref(),
        )?;

        // 3. Claim the pair; the store rejects a second open contract
        let now = self.clock.now();
        let mut contract =
            Contract::initiate(ContractId::new(), cmd.client_id, cmd.nutritionist_id, terms, now)?;
        self.contracts.insert_pending(&contract).await?;

        // 4. Request the authorization, rolling the claim back on failure
        let description = format!(
            "Nutrition contract with {}",
            nutritionist
                .as_ref()
                .map(|n| n.display_name_or_unknown())
                .unwrap_or_default()
        );
        let request = CreateAuthorizationRequest {
            amount: contract.terms.amount,
            currency: contract.terms.currency.clone(),
            description,
            metadata: AuthorizationMetadata {
                contract_id: contract.id,
                client_id: contract.client_id,
                nutritionist_id: contract.nutritionist_id,
                duration_months: contract.terms.duration.months(),
            },
            idempotency_key: Some(format!("contract-{}", contract.id)),
        };
        let authorization = match self.gateway.create_authorization(request).await {
            Ok(authorization) => authorization,
            Err(e) => {
                tracing::warn!(
                    contract_id = %contract.id,
                    error = %e,
                    "Payment authorization failed, discarding pending contract"
                );
                self.discard(&contract.id).await;
                return Err(e.into());
            }
        };

        // 5. Link the authorization
        if let Err(e) = contract.attach_authorization(&authorization.id, now) {
            tracing::warn!(
                contract_id = %contract.id,
                error = %e,
                "Gateway returned an unusable authorization, discarding pending contract"
            );
            self.discard(&contract.id).await;
            return Err(e.into());
        }
        if let Err(e) = self.contracts.update(&contract, ContractStatus::Pending).await {
            tracing::error!(
                contract_id = %contract.id,
                authorization_id = %authorization.id,
                error = %e,
                "Failed to link payment authorization"
            );
            self.discard(&contract.id).await;
            return Err(e.into());
        }
        contract.version += 1;

        tracing::info!(
            contract_id = %contract.id,
            client_id = %contract.client_id,
            nutritionist_id = %contract.nutritionist_id,
            authorization_id = %authorization.id,
            "Contract initiated"
        );

        // 6. Publish
        let event = ContractEvent::Initiated {
            contract_id: contract.id,
            client_id: contract.client_id,
            nutritionist_id: contract.nutritionist_id,
            amount: contract.terms.amount,
            duration_months: contract.terms.duration.months(),
            payment_authorization_id: authorization.id.clone(),
            occurred_at: now,
        };
        publish_after_commit(
            self.event_publisher.as_ref(),
            event.to_envelope().with_user_id(cmd.client_id.to_string()),
        )
        .await;

        Ok(InitiateContractResult {
            contract,
            authorization_id: authorization.id,
            client_secret: authorization.client_secret,
        })
    }

    async fn discard(&self, id: &ContractId) {
        if let Err(e) = self.contracts.discard_unauthorized(id).await {
            tracing::error!(contract_id = %id, error = %e, "Failed to discard pending contract");
        }
    }
}
