//! Request and response DTOs for contract endpoints.

use serde::{Deserialize, Serialize};

use crate::application::handlers::contract::{
    CancelContractResult, ClientSummary, ContractSummary, InitiateContractResult,
    ReconcileContractResult,
};
use crate::domain::contract::{Activation, Contract, ContractStatus};
use crate::domain::foundation::{ContractId, Timestamp, UserId};

// ════════════════════════════════════════════════════════════════════════════════
// Requests
// ════════════════════════════════════════════════════════════════════════════════

/// Body of `POST /contracts`. The caller is the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitiateContractRequest {
    pub nutritionist_id: UserId,
    pub amount_cents: i64,
    #[serde(default)]
    pub currency: Option<String>,
    pub duration_months: i64,
    pub description: String,
}

/// Body of `POST /contracts/reconcile`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcileContractRequest {
    pub authorization_id: String,
}

// ════════════════════════════════════════════════════════════════════════════════
// Responses
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractResponse {
    pub id: ContractId,
    pub client_id: UserId,
    pub nutritionist_id: UserId,
    pub amount_cents: i64,
    pub currency: String,
    pub duration_months: i64,
    pub description: String,
    pub status: ContractStatus,
    pub validated: bool,
    pub payment_authorization_id: Option<String>,
    pub created_at: Timestamp,
    pub starts_at: Option<Timestamp>,
    pub ends_at: Option<Timestamp>,
}

impl From<Contract> for ContractResponse {
    fn from(contract: Contract) -> Self {
        Self {
            id: contract.id,
            client_id: contract.client_id,
            nutritionist_id: contract.nutritionist_id,
            amount_cents: contract.terms.amount.cents(),
            currency: contract.terms.currency.as_str().to_string(),
            duration_months: contract.terms.duration.months(),
            description: contract.terms.description,
            status: contract.status,
            validated: contract.validated,
            payment_authorization_id: contract.payment_authorization_id,
            created_at: contract.created_at,
            starts_at: contract.starts_at,
            ends_at: contract.ends_at,
        }
    }
}

/// A contract seen from one of its parties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractSummaryResponse {
    #[serde(flatten)]
    pub contract: ContractResponse,
    pub counterpart_id: UserId,
    pub counterpart_name: String,
}

impl From<ContractSummary> for ContractSummaryResponse {
    fn from(summary: ContractSummary) -> Self {
        Self {
            contract: summary.contract.into(),
            counterpart_id: summary.counterpart_id,
            counterpart_name: summary.counterpart_name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitiateContractResponse {
    pub contract: ContractResponse,
    pub authorization_id: String,
    /// Used by the client to confirm the payment with the provider.
    pub client_secret: String,
}

impl From<InitiateContractResult> for InitiateContractResponse {
    fn from(result: InitiateContractResult) -> Self {
        Self {
            contract: result.contract.into(),
            authorization_id: result.authorization_id,
            client_secret: result.client_secret,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconcileContractResponse {
    pub contract: ContractResponse,
    /// `activated` or `already_active`.
    pub outcome: String,
}

impl From<ReconcileContractResult> for ReconcileContractResponse {
    fn from(result: ReconcileContractResult) -> Self {
        let outcome = match result.outcome {
            Activation::Activated => "activated",
            Activation::AlreadyActive => "already_active",
        };
        Self {
            contract: result.contract.into(),
            outcome: outcome.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CancelContractResponse {
    pub contract: ContractResponse,
    pub was_active: bool,
}

impl From<CancelContractResult> for CancelContractResponse {
    fn from(result: CancelContractResult) -> Self {
        Self {
            contract: result.contract.into(),
            was_active: result.was_active,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientResponse {
    pub client_id: UserId,
    pub display_name: String,
    pub contract_id: ContractId,
    pub contract_status: ContractStatus,
}

impl From<ClientSummary> for ClientResponse {
    fn from(summary: ClientSummary) -> Self {
        Self {
            client_id: summary.client_id,
            display_name: summary.display_name,
            contract_id: summary.contract_id,
            contract_status: summary.contract_status,
        }
    }
}

/// Result of a maintenance run over contracts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractBatchResponse {
    pub count: usize,
    pub contracts: Vec<ContractResponse>,
}

impl From<Vec<Contract>> for ContractBatchResponse {
    fn from(contracts: Vec<Contract>) -> Self {
        Self {
            count: contracts.len(),
            contracts: contracts.into_iter().map(Into::into).collect(),
        }
    }
}

/// Acknowledgement returned to the payment provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookAckResponse {
    pub received: bool,
    /// `contract_activated`, `already_active`, `payment_failed` or `ignored`.
    pub outcome: String,
}
