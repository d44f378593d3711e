//! Contract handlers.
//!
//! ## Commands
//! - Initiating a contract and requesting its payment authorization
//! - Reconciling a payment (client confirmation or webhook)
//! - Cancelling a contract
//! - Completing elapsed contracts
//!
//! ## Queries
//! - Listing a party's contracts, fetching one contract
//! - Listing a nutritionist's clients
//! - Reporting stale pending contracts

mod cancel_contract;
mod complete_contracts;
mod get_contract;
mod handle_payment_webhook;
mod initiate_contract;
mod list_clients;
mod list_contracts;
mod list_stale_pending;
mod reconcile_contract;

// Commands
pub use cancel_contract::{CancelContractCommand, CancelContractHandler, CancelContractResult};
pub use complete_contracts::{
    CompleteContractsCommand, CompleteContractsHandler, CompleteContractsResult,
};
pub use handle_payment_webhook::{
    HandlePaymentWebhookCommand, HandlePaymentWebhookHandler, HandlePaymentWebhookResult,
};
pub use initiate_contract::{
    InitiateContractCommand, InitiateContractHandler, InitiateContractResult,
};
pub use reconcile_contract::{
    ReconcileContractCommand, ReconcileContractHandler, ReconcileContractResult,
};

// Queries
pub use get_contract::{GetContractHandler, GetContractQuery};
pub use list_clients::{ClientSummary, ListClientsHandler, ListClientsQuery};
pub use list_contracts::{ContractSummary, ListContractsHandler, ListContractsQuery};
pub use list_stale_pending::{ListStalePendingHandler, ListStalePendingQuery};
