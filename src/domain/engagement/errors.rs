//! Engagement error taxonomy.
//!
//! Every exposed contract and diet operation fails with one of these kinds.
//! Lower layers speak `DomainError`; the `From` impl below folds those into
//! the matching kind so handlers can use `?` on port calls.
//!
//! # HTTP Status Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | InvalidParty | 400 |
//! | InvalidTerms | 400 |
//! | ValidationFailed | 400 |
//! | PaymentNotSucceeded | 402 |
//! | Forbidden | 403 |
//! | NoActiveEngagement | 403 |
//! | NotFound | 404 |
//! | DuplicateEngagement | 409 |
//! | InvalidState | 409 |
//! | GatewayUnavailable | 502 |
//! | GatewayRejected | 502 |
//! | StoreUnavailable | 503 |

use crate::domain::foundation::{DomainError, ErrorCode, UserId, ValidationError};

/// Engagement-level errors shared by the contract and diet lifecycles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngagementError {
    /// Self-engagement, wrong role, unknown or unverified nutritionist.
    InvalidParty(String),

    /// Contract terms outside the configured bounds.
    InvalidTerms { field: String, message: String },

    /// A pending or active contract already exists for the pair.
    DuplicateEngagement {
        client_id: UserId,
        nutritionist_id: UserId,
    },

    /// The gateway does not (yet) report the authorization as succeeded.
    PaymentNotSucceeded {
        authorization_id: String,
        status: String,
    },

    /// The payment gateway failed or timed out.
    GatewayUnavailable(String),

    /// The gateway refused the request outright (bad credentials, malformed
    /// request). Retrying the same request will fail the same way.
    GatewayRejected(String),

    /// The referenced entity does not exist.
    NotFound { resource: &'static str, id: String },

    /// The requester may not perform this operation.
    Forbidden(String),

    /// The transition is not allowed from the entity's current state.
    InvalidState { current: String, attempted: String },

    /// No qualifying contract binds the nutritionist to the client.
    NoActiveEngagement {
        client_id: UserId,
        nutritionist_id: UserId,
    },

    /// Diet content failed validation.
    ValidationFailed { field: String, message: String },

    /// Persistence failed or timed out.
    StoreUnavailable(String),
}

impl EngagementError {
    pub fn invalid_party(reason: impl Into<String>) -> Self {
        EngagementError::InvalidParty(reason.into())
    }

    pub fn invalid_terms(field: impl Into<String>, message: impl Into<String>) -> Self {
        EngagementError::InvalidTerms {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn duplicate_engagement(client_id: UserId, nutritionist_id: UserId) -> Self {
        EngagementError::DuplicateEngagement {
            client_id,
            nutritionist_id,
        }
    }

    pub fn payment_not_succeeded(
        authorization_id: impl Into<String>,
        status: impl Into<String>,
    ) -> Self {
        EngagementError::PaymentNotSucceeded {
            authorization_id: authorization_id.into(),
            status: status.into(),
        }
    }

    pub fn gateway_unavailable(message: impl Into<String>) -> Self {
        EngagementError::GatewayUnavailable(message.into())
    }

    pub fn not_found(resource: &'static str, id: impl ToString) -> Self {
        EngagementError::NotFound {
            resource,
            id: id.to_string(),
        }
    }

    pub fn forbidden(reason: impl Into<String>) -> Self {
        EngagementError::Forbidden(reason.into())
    }

    pub fn invalid_state(current: impl Into<String>, attempted: impl Into<String>) -> Self {
        EngagementError::InvalidState {
            current: current.into(),
            attempted: attempted.into(),
        }
    }

    pub fn no_active_engagement(client_id: UserId, nutritionist_id: UserId) -> Self {
        EngagementError::NoActiveEngagement {
            client_id,
            nutritionist_id,
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        EngagementError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn store_unavailable(message: impl Into<String>) -> Self {
        EngagementError::StoreUnavailable(message.into())
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            EngagementError::InvalidParty(_) => ErrorCode::InvalidParty,
            EngagementError::InvalidTerms { .. } => ErrorCode::InvalidTerms,
            EngagementError::DuplicateEngagement { .. } => ErrorCode::DuplicateEngagement,
            EngagementError::PaymentNotSucceeded { .. } => ErrorCode::PaymentNotSucceeded,
            EngagementError::GatewayUnavailable(_) => ErrorCode::ExternalServiceError,
            EngagementError::GatewayRejected(_) => ErrorCode::GatewayRejected,
            EngagementError::NotFound { resource, .. } => match *resource {
                "contract" => ErrorCode::ContractNotFound,
                "diet" => ErrorCode::DietNotFound,
                "payment_authorization" => ErrorCode::AuthorizationNotFound,
                _ => ErrorCode::PartyNotFound,
            },
            EngagementError::Forbidden(_) => ErrorCode::Forbidden,
            EngagementError::InvalidState { .. } => ErrorCode::InvalidStateTransition,
            EngagementError::NoActiveEngagement { .. } => ErrorCode::NoActiveEngagement,
            EngagementError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            EngagementError::StoreUnavailable(_) => ErrorCode::DatabaseError,
        }
    }

    /// Returns a user-facing error message.
    pub fn message(&self) -> String {
        match self {
            EngagementError::InvalidParty(reason) => format!("Invalid party: {}", reason),
            EngagementError::InvalidTerms { field, message } => {
                format!("Invalid contract terms for '{}': {}", field, message)
            }
            EngagementError::DuplicateEngagement {
                client_id,
                nutritionist_id,
            } => format!(
                "Client {} already has an open contract with nutritionist {}",
                client_id, nutritionist_id
            ),
            EngagementError::PaymentNotSucceeded {
                authorization_id,
                status,
            } => format!(
                "Payment {} has not succeeded (status: {})",
                authorization_id, status
            ),
            EngagementError::GatewayUnavailable(msg) => {
                format!("Payment gateway unavailable: {}", msg)
            }
            EngagementError::GatewayRejected(msg) => {
                format!("Payment gateway rejected the request: {}", msg)
            }
            EngagementError::NotFound { resource, id } => {
                format!("{} not found: {}", resource, id)
            }
            EngagementError::Forbidden(reason) => format!("Forbidden: {}", reason),
            EngagementError::InvalidState { current, attempted } => {
                format!("Cannot {} while {}", attempted, current)
            }
            EngagementError::NoActiveEngagement {
                client_id,
                nutritionist_id,
            } => format!(
                "Nutritionist {} has no qualifying contract with client {}",
                nutritionist_id, client_id
            ),
            EngagementError::ValidationFailed { field, message } => {
                format!("Validation failed for '{}': {}", field, message)
            }
            EngagementError::StoreUnavailable(msg) => format!("Storage unavailable: {}", msg),
        }
    }

    /// Returns true if the caller may retry the same request later.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            EngagementError::GatewayUnavailable(_)
                | EngagementError::StoreUnavailable(_)
                | EngagementError::PaymentNotSucceeded { .. }
        )
    }
}

impl std::fmt::Display for EngagementError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for EngagementError {}

fn detail_or(err: &DomainError, key: &str, fallback: &str) -> String {
    err.detail(key).unwrap_or(fallback).to_string()
}

fn detail_user(err: &DomainError, key: &str) -> Option<UserId> {
    err.detail(key).and_then(|s| s.parse().ok())
}

impl From<DomainError> for EngagementError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::ValidationFailed => EngagementError::ValidationFailed {
                field: detail_or(&err, "field", "unknown"),
                message: err.message,
            },
            ErrorCode::InvalidParty => EngagementError::InvalidParty(err.message),
            ErrorCode::InvalidTerms => EngagementError::InvalidTerms {
                field: detail_or(&err, "field", "unknown"),
                message: err.message,
            },
            ErrorCode::ContractNotFound => EngagementError::NotFound {
                resource: "contract",
                id: detail_or(&err, "id", "unknown"),
            },
            ErrorCode::DietNotFound => EngagementError::NotFound {
                resource: "diet",
                id: detail_or(&err, "id", "unknown"),
            },
            ErrorCode::PartyNotFound => EngagementError::NotFound {
                resource: "party",
                id: detail_or(&err, "id", "unknown"),
            },
            ErrorCode::AuthorizationNotFound => EngagementError::NotFound {
                resource: "payment_authorization",
                id: detail_or(&err, "id", "unknown"),
            },
            ErrorCode::InvalidStateTransition | ErrorCode::ConcurrentModification => {
                EngagementError::InvalidState {
                    current: detail_or(&err, "current", "unknown"),
                    attempted: detail_or(&err, "attempted", &err.message),
                }
            }
            ErrorCode::DuplicateEngagement => {
                match (
                    detail_user(&err, "client_id"),
                    detail_user(&err, "nutritionist_id"),
                ) {
                    (Some(client_id), Some(nutritionist_id)) => {
                        EngagementError::DuplicateEngagement {
                            client_id,
                            nutritionist_id,
                        }
                    }
                    _ => EngagementError::InvalidState {
                        current: "open".to_string(),
                        attempted: err.message,
                    },
                }
            }
            ErrorCode::NoActiveEngagement => {
                match (
                    detail_user(&err, "client_id"),
                    detail_user(&err, "nutritionist_id"),
                ) {
                    (Some(client_id), Some(nutritionist_id)) => {
                        EngagementError::NoActiveEngagement {
                            client_id,
                            nutritionist_id,
                        }
                    }
                    _ => EngagementError::Forbidden(err.message),
                }
            }
            ErrorCode::Unauthorized | ErrorCode::Forbidden => {
                EngagementError::Forbidden(err.message)
            }
            ErrorCode::PaymentNotSucceeded => EngagementError::PaymentNotSucceeded {
                authorization_id: detail_or(&err, "authorization_id", "unknown"),
                status: detail_or(&err, "status", "unknown"),
            },
            ErrorCode::ExternalServiceError => EngagementError::GatewayUnavailable(err.message),
            ErrorCode::GatewayRejected => EngagementError::GatewayRejected(err.message),
            ErrorCode::DatabaseError | ErrorCode::InternalError => {
                EngagementError::StoreUnavailable(err.message)
            }
        }
    }
}

impl From<ValidationError> for EngagementError {
    fn from(err: ValidationError) -> Self {
        EngagementError::ValidationFailed {
            field: err.field().to_string(),
            message: err.to_string(),
        }
    }
}

impl From<EngagementError> for DomainError {
    fn from(err: EngagementError) -> Self {
        DomainError::new(err.code(), err.message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_errors_become_store_unavailable() {
        let err: EngagementError = DomainError::database("pool timed out").into();
        assert_eq!(err, EngagementError::store_unavailable("pool timed out"));
        assert!(err.is_retryable());
    }

    #[test]
    fn invalid_transition_keeps_state_details() {
        let err: EngagementError =
            DomainError::new(ErrorCode::InvalidStateTransition, "Cannot cancel")
                .with_detail("current", "completed")
                .with_detail("attempted", "cancel")
                .into();
        assert_eq!(err, EngagementError::invalid_state("completed", "cancel"));
    }

    #[test]
    fn duplicate_engagement_reads_party_details() {
        let client = UserId::new();
        let nutritionist = UserId::new();
        let err: EngagementError = DomainError::new(ErrorCode::DuplicateEngagement, "dup")
            .with_detail("client_id", client.to_string())
            .with_detail("nutritionist_id", nutritionist.to_string())
            .into();
        assert_eq!(err, EngagementError::duplicate_engagement(client, nutritionist));
    }

    #[test]
    fn not_found_code_depends_on_resource() {
        assert_eq!(
            EngagementError::not_found("contract", "c-1").code(),
            ErrorCode::ContractNotFound
        );
        assert_eq!(
            EngagementError::not_found("diet", "d-1").code(),
            ErrorCode::DietNotFound
        );
    }

    #[test]
    fn client_errors_are_not_retryable() {
        assert!(!EngagementError::forbidden("nope").is_retryable());
        assert!(!EngagementError::invalid_terms("amount", "too low").is_retryable());
        assert!(!EngagementError::duplicate_engagement(UserId::new(), UserId::new()).is_retryable());
    }

    #[test]
    fn display_uses_message() {
        let err = EngagementError::invalid_state("completed", "cancel contract");
        assert_eq!(err.to_string(), "Cannot cancel contract while completed");
    }
}
