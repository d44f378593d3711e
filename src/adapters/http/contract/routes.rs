//! Axum router configuration for contract endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{
    cancel_contract, complete_contracts, get_contract, handle_payment_webhook,
    initiate_contract, list_clients, list_contracts, list_stale_pending, reconcile_contract,
};
use crate::adapters::http::state::EngagementAppState;

/// Create the contract API router.
///
/// # Routes
///
/// ## Party Endpoints (require `X-User-Id`)
/// - `GET /` - Contracts of the caller
/// - `POST /` - Initiate a contract
/// - `GET /clients` - Clients of the calling nutritionist
/// - `POST /reconcile` - Apply a confirmed payment
/// - `GET /:id` - Get one contract
/// - `POST /:id/cancel` - Cancel a contract
pub fn contract_routes() -> Router<EngagementAppState> {
    Router::new()
        .route("/", get(list_contracts).post(initiate_contract))
        .route("/clients", get(list_clients))
        .route("/reconcile", post(reconcile_contract))
        .route("/:id", get(get_contract))
        .route("/:id/cancel", post(cancel_contract))
}

/// Create the payment webhook router.
///
/// Webhooks carry no user identity; they are verified via signature.
///
/// # Routes
/// - `POST /stripe` - Handle Stripe webhooks
pub fn webhook_routes() -> Router<EngagementAppState> {
    Router::new().route("/stripe", post(handle_payment_webhook))
}

/// Create the contract maintenance router, meant for an internal scheduler.
///
/// # Routes
/// - `POST /complete` - Complete elapsed contracts
/// - `GET /stale` - Report pending contracts past the grace period
pub fn contract_maintenance_routes() -> Router<EngagementAppState> {
    Router::new()
        .route("/complete", post(complete_contracts))
        .route("/stale", get(list_stale_pending))
}

/// Combine the contract, webhook and maintenance routers for mounting under `/api`.
pub fn contract_router() -> Router<EngagementAppState> {
    Router::new()
        .nest("/contracts", contract_routes())
        .nest("/webhooks", webhook_routes())
        .nest("/maintenance/contracts", contract_maintenance_routes())
}
