//! Payment gateway port.
//!
//! The core needs two things from a payment provider: open an authorization
//! for a pending contract, and later ask whether it succeeded. Webhook
//! verification lets the provider push the same answer.
//!
//! # Design
//!
//! - **Gateway agnostic**: nothing here is Stripe-specific
//! - **Mutually discoverable**: the authorization carries the contract id in
//!   its metadata and the contract stores the authorization id
//! - **Transient unless proven terminal**: `NotFound`, `InvalidWebhook`,
//!   `InvalidRequest` and `AuthenticationError` are final; everything else
//!   surfaces as `GatewayUnavailable`

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::contract::{Currency, Money};
use crate::domain::engagement::EngagementError;
use crate::domain::foundation::{ContractId, UserId};

/// Port for the external payment gateway.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Opens a payment authorization for a pending contract.
    async fn create_authorization(
        &self,
        request: CreateAuthorizationRequest,
    ) -> Result<PaymentAuthorization, PaymentError>;

    /// Current status of an authorization.
    async fn get_status(&self, authorization_id: &str)
        -> Result<AuthorizationStatus, PaymentError>;

    /// Verifies a signed webhook payload and extracts the event.
    async fn verify_webhook(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> Result<PaymentWebhookEvent, PaymentError>;
}

/// Request to open an authorization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAuthorizationRequest {
    pub amount: Money,
    pub currency: Currency,
    pub description: String,
    pub metadata: AuthorizationMetadata,
    /// Provider-side idempotency key; retries with the same key return the same authorization.
    pub idempotency_key: Option<String>,
}

/// Reference data stored on the authorization by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationMetadata {
    pub contract_id: ContractId,
    pub client_id: UserId,
    pub nutritionist_id: UserId,
    pub duration_months: i64,
}

/// An authorization as returned to the paying client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentAuthorization {
    pub id: String,
    /// Handle the client uses to confirm the payment.
    pub client_secret: String,
}

/// Gateway view of an authorization, collapsed to what the core acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthorizationStatus {
    /// Awaiting customer action or processing.
    Pending,
    Succeeded,
    /// Cancelled or permanently failed.
    Failed,
}

impl AuthorizationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthorizationStatus::Pending => "pending",
            AuthorizationStatus::Succeeded => "succeeded",
            AuthorizationStatus::Failed => "failed",
        }
    }
}

/// Verified webhook event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentWebhookEvent {
    pub id: String,
    pub event_type: PaymentWebhookEventType,
    pub authorization_id: Option<String>,
    /// Contract id read back from the authorization metadata.
    pub contract_id: Option<ContractId>,
    pub created_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentWebhookEventType {
    AuthorizationSucceeded,
    AuthorizationFailed,
    Unknown(String),
}

/// Payment gateway error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentError {
    pub code: PaymentErrorCode,
    pub message: String,
    pub provider_code: Option<String>,
    pub retryable: bool,
}

impl PaymentError {
    pub fn new(code: PaymentErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            provider_code: None,
            retryable: code.is_retryable(),
        }
    }

    pub fn with_provider_code(mut self, code: impl Into<String>) -> Self {
        self.provider_code = Some(code.into());
        self
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::NetworkError, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::Timeout, message)
    }

    pub fn not_found(resource: &str) -> Self {
        Self::new(PaymentErrorCode::NotFound, format!("{} not found", resource))
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::InvalidRequest, message)
    }

    pub fn invalid_webhook(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::InvalidWebhook, message)
    }

    pub fn provider(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::ProviderError, message)
    }
}

impl std::fmt::Display for PaymentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for PaymentError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentErrorCode {
    NetworkError,
    Timeout,
    AuthenticationError,
    NotFound,
    InvalidRequest,
    RateLimitExceeded,
    InvalidWebhook,
    ProviderError,
}

impl PaymentErrorCode {
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PaymentErrorCode::NetworkError
                | PaymentErrorCode::Timeout
                | PaymentErrorCode::RateLimitExceeded
        )
    }
}

impl std::fmt::Display for PaymentErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PaymentErrorCode::NetworkError => "network_error",
            PaymentErrorCode::Timeout => "timeout",
            PaymentErrorCode::AuthenticationError => "authentication_error",
            PaymentErrorCode::NotFound => "not_found",
            PaymentErrorCode::InvalidRequest => "invalid_request",
            PaymentErrorCode::RateLimitExceeded => "rate_limit_exceeded",
            PaymentErrorCode::InvalidWebhook => "invalid_webhook",
            PaymentErrorCode::ProviderError => "provider_error",
        };
        write!(f, "{}", s)
    }
}

impl From<PaymentError> for EngagementError {
    fn from(err: PaymentError) -> Self {
        match err.code {
            PaymentErrorCode::NotFound => EngagementError::NotFound {
                resource: "payment_authorization",
                id: err.message,
            },
            PaymentErrorCode::InvalidWebhook => EngagementError::validation("signature", err.message),
            PaymentErrorCode::InvalidRequest | PaymentErrorCode::AuthenticationError => {
                EngagementError::GatewayRejected(err.to_string())
            }
            _ => EngagementError::GatewayUnavailable(err.to_string()),
        }
    }
}
