//! HTTP handlers for contract endpoints.
//!
//! These handlers connect Axum routes to application layer command/query handlers.

use axum::body::Bytes;
use axum::extract::{Json, Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;

use crate::adapters::http::error::ApiError;
use crate::adapters::http::extract::{parse_id, ApiJson};
use crate::adapters::http::middleware::RequireUser;
use crate::adapters::http::state::EngagementAppState;
use crate::application::handlers::contract::{
    CancelContractCommand, CompleteContractsCommand, GetContractQuery,
    HandlePaymentWebhookCommand, HandlePaymentWebhookResult, InitiateContractCommand,
    ListClientsQuery, ListContractsQuery, ListStalePendingQuery, ReconcileContractCommand,
};
use crate::domain::engagement::EngagementError;
use crate::domain::foundation::ContractId;

use super::dto::{
    CancelContractResponse, ClientResponse, ContractBatchResponse, ContractSummaryResponse,
    InitiateContractRequest, InitiateContractResponse, ReconcileContractRequest,
    ReconcileContractResponse, WebhookAckResponse,
};

const SIGNATURE_HEADER: &str = "Stripe-Signature";

// ════════════════════════════════════════════════════════════════════════════════
// Query Handlers (GET endpoints)
// ════════════════════════════════════════════════════════════════════════════════

/// GET /api/contracts - Contracts where the caller is client or nutritionist
pub async fn list_contracts(
    State(state): State<EngagementAppState>,
    RequireUser(user_id): RequireUser,
) -> Result<impl IntoResponse, ApiError> {
    let summaries = state
        .list_contracts_handler()
        .handle(ListContractsQuery { party_id: user_id })
        .await?;

    let response: Vec<ContractSummaryResponse> = summaries.into_iter().map(Into::into).collect();
    Ok(Json(response))
}

/// GET /api/contracts/:id - One contract, visible to its parties only
pub async fn get_contract(
    State(state): State<EngagementAppState>,
    RequireUser(user_id): RequireUser,
    Path(contract_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let contract_id: ContractId = parse_id(&contract_id, "contract_id")?;

    let summary = state
        .get_contract_handler()
        .handle(GetContractQuery {
            contract_id,
            requester_id: user_id,
        })
        .await?;

    Ok(Json(ContractSummaryResponse::from(summary)))
}

/// GET /api/contracts/clients - Clients the calling nutritionist serves
pub async fn list_clients(
    State(state): State<EngagementAppState>,
    RequireUser(user_id): RequireUser,
) -> Result<impl IntoResponse, ApiError> {
    let clients = state
        .list_clients_handler()
        .handle(ListClientsQuery {
            nutritionist_id: user_id,
        })
        .await?;

    let response: Vec<ClientResponse> = clients.into_iter().map(Into::into).collect();
    Ok(Json(response))
}

// ════════════════════════════════════════════════════════════════════════════════
// Command Handlers (POST endpoints)
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/contracts - Initiate a contract with a nutritionist
pub async fn initiate_contract(
    State(state): State<EngagementAppState>,
    RequireUser(user_id): RequireUser,
    ApiJson(request): ApiJson<InitiateContractRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let cmd = InitiateContractCommand {
        client_id: user_id,
        nutritionist_id: request.nutritionist_id,
        amount_cents: request.amount_cents,
        currency: request.currency,
        duration_months: request.duration_months,
        description: request.description,
    };

    let result = state.initiate_contract_handler().handle(cmd).await?;

    Ok((StatusCode::CREATED, Json(InitiateContractResponse::from(result))))
}

/// POST /api/contracts/reconcile - Apply a confirmed payment
pub async fn reconcile_contract(
    State(state): State<EngagementAppState>,
    RequireUser(_user_id): RequireUser,
    ApiJson(request): ApiJson<ReconcileContractRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let result = state
        .reconcile_contract_handler()
        .handle(ReconcileContractCommand {
            authorization_id: request.authorization_id,
        })
        .await?;

    Ok(Json(ReconcileContractResponse::from(result)))
}

/// POST /api/contracts/:id/cancel - Cancel a contract (client only)
pub async fn cancel_contract(
    State(state): State<EngagementAppState>,
    RequireUser(user_id): RequireUser,
    Path(contract_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let contract_id: ContractId = parse_id(&contract_id, "contract_id")?;

    let result = state
        .cancel_contract_handler()
        .handle(CancelContractCommand {
            contract_id,
            requester_id: user_id,
        })
        .await?;

    Ok(Json(CancelContractResponse::from(result)))
}

// ════════════════════════════════════════════════════════════════════════════════
// Maintenance (scheduler-triggered)
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/maintenance/contracts/complete - Complete elapsed contracts
pub async fn complete_contracts(
    State(state): State<EngagementAppState>,
) -> Result<impl IntoResponse, ApiError> {
    let result = state
        .complete_contracts_handler()
        .handle(CompleteContractsCommand)
        .await?;

    Ok(Json(ContractBatchResponse::from(result.completed)))
}

/// GET /api/maintenance/contracts/stale - Pending contracts past the grace period
pub async fn list_stale_pending(
    State(state): State<EngagementAppState>,
) -> Result<impl IntoResponse, ApiError> {
    let stale = state
        .list_stale_pending_handler()
        .handle(ListStalePendingQuery)
        .await?;

    Ok(Json(ContractBatchResponse::from(stale)))
}

// ════════════════════════════════════════════════════════════════════════════════
// Webhooks
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/webhooks/stripe - Handle payment provider webhook events
pub async fn handle_payment_webhook(
    State(state): State<EngagementAppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            tracing::warn!("Webhook rejected: missing signature header");
            EngagementError::validation(SIGNATURE_HEADER, "Missing Stripe-Signature header")
        })?;

    let result = state
        .webhook_handler()
        .handle(HandlePaymentWebhookCommand {
            payload: body.to_vec(),
            signature: signature.to_string(),
        })
        .await?;

    let outcome = match result {
        HandlePaymentWebhookResult::ContractActivated { .. } => "contract_activated",
        HandlePaymentWebhookResult::AlreadyActive { .. } => "already_active",
        HandlePaymentWebhookResult::PaymentFailed { .. } => "payment_failed",
        HandlePaymentWebhookResult::Ignored { .. } => "ignored",
    };

    Ok(Json(WebhookAckResponse {
        received: true,
        outcome: outcome.to_string(),
    }))
}
