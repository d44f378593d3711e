//! Shared application state for the HTTP adapter.

use std::sync::Arc;

use crate::application::handlers::contract::{
    CancelContractHandler, CompleteContractsHandler, GetContractHandler,
    HandlePaymentWebhookHandler, InitiateContractHandler, ListClientsHandler,
    ListContractsHandler, ListStalePendingHandler, ReconcileContractHandler,
};
use crate::application::handlers::diet::{
    CreateDietHandler, DietStatusHandler, ListDietsHandler, PauseDietHandler,
    ReactivateDietHandler, ReassignDietHandler, RenewDietHandler, SweepExpirationsHandler,
};
use crate::application::EngagementGuard;
use crate::config::EngagementConfig;
use crate::ports::{
    Clock, ContractRepository, DietRepository, EventPublisher, PartyDirectory, PaymentGateway,
};

/// Shared application state containing all dependencies.
///
/// Cloned for each request; dependencies are Arc-wrapped and handlers are
/// built on demand from them.
#[derive(Clone)]
pub struct EngagementAppState {
    pub contracts: Arc<dyn ContractRepository>,
    pub diets: Arc<dyn DietRepository>,
    pub parties: Arc<dyn PartyDirectory>,
    pub payment_gateway: Arc<dyn PaymentGateway>,
    pub event_publisher: Arc<dyn EventPublisher>,
    pub clock: Arc<dyn Clock>,
    pub settings: EngagementConfig,
    pub default_currency: String,
}

impl EngagementAppState {
    fn guard(&self) -> EngagementGuard {
        EngagementGuard::new(self.contracts.clone(), self.settings.policy())
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Contracts
    // ════════════════════════════════════════════════════════════════════════════

    pub fn initiate_contract_handler(&self) -> InitiateContractHandler {
        InitiateContractHandler::new(
            self.contracts.clone(),
            self.parties.clone(),
            self.payment_gateway.clone(),
            self.event_publisher.clone(),
            self.clock.clone(),
            self.settings.terms_limits(),
            self.default_currency.clone(),
        )
    }

    pub fn reconcile_contract_handler(&self) -> ReconcileContractHandler {
        ReconcileContractHandler::new(
            self.contracts.clone(),
            self.payment_gateway.clone(),
            self.event_publisher.clone(),
            self.clock.clone(),
        )
    }

    pub fn cancel_contract_handler(&self) -> CancelContractHandler {
        CancelContractHandler::new(
            self.contracts.clone(),
            self.event_publisher.clone(),
            self.clock.clone(),
            Some(self.settings.cancellation_window()),
        )
    }

    pub fn list_contracts_handler(&self) -> ListContractsHandler {
        ListContractsHandler::new(self.contracts.clone(), self.parties.clone())
    }

    pub fn get_contract_handler(&self) -> GetContractHandler {
        GetContractHandler::new(self.contracts.clone(), self.parties.clone())
    }

    pub fn list_clients_handler(&self) -> ListClientsHandler {
        ListClientsHandler::new(self.contracts.clone(), self.parties.clone())
    }

    pub fn complete_contracts_handler(&self) -> CompleteContractsHandler {
        CompleteContractsHandler::new(
            self.contracts.clone(),
            self.event_publisher.clone(),
            self.clock.clone(),
        )
    }

    pub fn list_stale_pending_handler(&self) -> ListStalePendingHandler {
        ListStalePendingHandler::new(
            self.contracts.clone(),
            self.clock.clone(),
            self.settings.pending_grace(),
        )
    }

    pub fn webhook_handler(&self) -> HandlePaymentWebhookHandler {
        HandlePaymentWebhookHandler::new(
            self.payment_gateway.clone(),
            Arc::new(self.reconcile_contract_handler()),
        )
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Diets
    // ════════════════════════════════════════════════════════════════════════════

    pub fn create_diet_handler(&self) -> CreateDietHandler {
        CreateDietHandler::new(
            self.diets.clone(),
            self.guard(),
            self.event_publisher.clone(),
            self.clock.clone(),
            self.settings.diet_limits(),
            self.settings.cap_to_contract_end,
        )
    }

    pub fn renew_diet_handler(&self) -> RenewDietHandler {
        RenewDietHandler::new(
            self.diets.clone(),
            self.guard(),
            self.event_publisher.clone(),
            self.clock.clone(),
            self.settings.diet_limits(),
            self.settings.cap_to_contract_end,
        )
    }

    pub fn pause_diet_handler(&self) -> PauseDietHandler {
        PauseDietHandler::new(
            self.diets.clone(),
            self.guard(),
            self.event_publisher.clone(),
            self.clock.clone(),
        )
    }

    pub fn reactivate_diet_handler(&self) -> ReactivateDietHandler {
        ReactivateDietHandler::new(
            self.diets.clone(),
            self.guard(),
            self.event_publisher.clone(),
            self.clock.clone(),
        )
    }

    pub fn reassign_diet_handler(&self) -> ReassignDietHandler {
        ReassignDietHandler::new(
            self.diets.clone(),
            self.guard(),
            self.event_publisher.clone(),
            self.clock.clone(),
        )
    }

    pub fn diet_status_handler(&self) -> DietStatusHandler {
        DietStatusHandler::new(self.diets.clone(), self.guard(), self.clock.clone())
    }

    pub fn list_diets_handler(&self) -> ListDietsHandler {
        ListDietsHandler::new(
            self.diets.clone(),
            self.guard(),
            self.event_publisher.clone(),
            self.clock.clone(),
            self.settings.sweep_on_read,
        )
    }

    pub fn sweep_expirations_handler(&self) -> SweepExpirationsHandler {
        SweepExpirationsHandler::new(
            self.diets.clone(),
            self.event_publisher.clone(),
            self.clock.clone(),
        )
    }
}
