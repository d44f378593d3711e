//! HandlePaymentWebhookHandler - Command handler for payment gateway webhooks.
//!
//! A verified "succeeded" event runs the same reconcile path as a client
//! confirmation, so duplicate deliveries are harmless.

use std::sync::Arc;

use crate::domain::contract::{Activation, Contract};
use crate::domain::engagement::EngagementError;
use crate::ports::{PaymentGateway, PaymentWebhookEvent, PaymentWebhookEventType};

use super::reconcile_contract::{ReconcileContractCommand, ReconcileContractHandler};

/// Command to handle a payment webhook.
#[derive(Debug, Clone)]
pub struct HandlePaymentWebhookCommand {
    /// Raw webhook payload.
    pub payload: Vec<u8>,
    /// Webhook signature header.
    pub signature: String,
}

/// Result of webhook processing.
#[derive(Debug, Clone)]
pub enum HandlePaymentWebhookResult {
    /// Payment confirmed and the contract is active.
    ContractActivated { contract: Contract },
    /// Contract was already active; nothing changed.
    AlreadyActive { contract: Contract },
    /// Payment failed; the contract stays pending until the client retries or cancels.
    PaymentFailed { authorization_id: String },
    /// Event acknowledged but no action taken.
    Ignored { event_type: String },
}

/// Handler for processing payment gateway webhooks.
pub struct HandlePaymentWebhookHandler {
    gateway: Arc<dyn PaymentGateway>,
    reconcile: Arc<ReconcileContractHandler>,
}

impl HandlePaymentWebhookHandler {
    pub fn new(gateway: Arc<dyn PaymentGateway>, reconcile: Arc<ReconcileContractHandler>) -> Self {
        Self { gateway, reconcile }
    }

    pub async fn handle(
        &self,
        cmd: HandlePaymentWebhookCommand,
    ) -> Result<HandlePaymentWebhookResult, EngagementError> {
        // 1. Verify webhook signature and parse event
        let event = self
            .gateway
            .verify_webhook(&cmd.payload, &cmd.signature)
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "Rejected payment webhook");
                EngagementError::validation("signature", "invalid webhook signature")
            })?;

        // 2. Process based on event type
        match event.event_type.clone() {
            PaymentWebhookEventType::AuthorizationSucceeded => self.handle_succeeded(event).await,
            PaymentWebhookEventType::AuthorizationFailed => {
                let authorization_id = event.authorization_id.unwrap_or_default();
                tracing::info!(
                    event_id = %event.id,
                    authorization_id = %authorization_id,
                    "Payment authorization failed"
                );
                Ok(HandlePaymentWebhookResult::PaymentFailed { authorization_id })
            }
            PaymentWebhookEventType::Unknown(event_type) => {
                tracing::debug!(event_id = %event.id, event_type = %event_type, "Ignoring webhook");
                Ok(HandlePaymentWebhookResult::Ignored { event_type })
            }
        }
    }

    async fn handle_succeeded(
        &self,
        event: PaymentWebhookEvent,
    ) -> Result<HandlePaymentWebhookResult, EngagementError> {
        let Some(authorization_id) = event.authorization_id else {
            tracing::warn!(event_id = %event.id, "Succeeded webhook without authorization id");
            return Ok(HandlePaymentWebhookResult::Ignored {
                event_type: "authorization_succeeded".to_string(),
            });
        };

        let result = self
            .reconcile
            .handle(ReconcileContractCommand {
                authorization_id: authorization_id.clone(),
            })
            .await;

        match result {
            Ok(result) => Ok(match result.outcome {
                Activation::Activated => HandlePaymentWebhookResult::ContractActivated {
                    contract: result.contract,
                },
                Activation::AlreadyActive => HandlePaymentWebhookResult::AlreadyActive {
                    contract: result.contract,
                },
            }),
            // The pending row may have been discarded or cancelled in the meantime.
            Err(EngagementError::NotFound { .. }) | Err(EngagementError::InvalidState { .. }) => {
                tracing::warn!(
                    event_id = %event.id,
                    authorization_id = %authorization_id,
                    "No pending contract for succeeded payment"
                );
                Ok(HandlePaymentWebhookResult::Ignored {
                    event_type: "authorization_succeeded".to_string(),
                })
            }
            Err(e) => Err(e),
        }
    }
}
