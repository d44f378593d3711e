//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Persistence
//!
//! - `ContractRepository` - contracts, with atomic duplicate prevention
//! - `DietRepository` - diets, with atomic renewal writes
//! - `PartyDirectory` - read-only user accounts
//!
//! ## External Services
//!
//! - `PaymentGateway` - payment authorizations and webhooks
//! - `EventPublisher` - domain event delivery
//! - `Clock` - current time

mod clock;
mod contract_repository;
mod diet_repository;
mod event_publisher;
mod party_directory;
mod payment_gateway;

pub use clock::Clock;
pub use contract_repository::ContractRepository;
pub use diet_repository::DietRepository;
pub use event_publisher::EventPublisher;
pub use party_directory::PartyDirectory;
pub use payment_gateway::{
    AuthorizationMetadata, AuthorizationStatus, CreateAuthorizationRequest, PaymentAuthorization,
    PaymentError, PaymentErrorCode, PaymentGateway, PaymentWebhookEvent, PaymentWebhookEventType,
};
