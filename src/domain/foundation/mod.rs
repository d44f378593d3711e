//! Foundation module - Shared domain primitives.
//!
//! Contains identifiers, timestamps, the state machine trait, events and the
//! error types that form the vocabulary of the engagement domain.

mod errors;
mod events;
mod ids;
mod state_machine;
mod timestamp;

pub use errors::{DomainError, ErrorCode, ValidationError};
pub use events::{EventEnvelope, EventId, EventMetadata};
pub use ids::{ContractId, DietId, UserId};
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
