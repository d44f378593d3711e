//! HTTP adapter for contract endpoints.
//!
//! Exposes the contract lifecycle via REST API:
//! - `GET /api/contracts` - Contracts of the caller
//! - `POST /api/contracts` - Initiate a contract and its payment authorization
//! - `GET /api/contracts/clients` - Clients of the calling nutritionist
//! - `POST /api/contracts/reconcile` - Apply a confirmed payment
//! - `GET /api/contracts/:id` - Get one contract
//! - `POST /api/contracts/:id/cancel` - Cancel a contract
//! - `POST /api/webhooks/stripe` - Handle Stripe webhooks
//! - `POST /api/maintenance/contracts/complete` - Complete elapsed contracts
//! - `GET /api/maintenance/contracts/stale` - Stale pending contracts

pub mod dto;
pub mod handlers;
pub mod routes;

pub use dto::*;
pub use routes::contract_router;
