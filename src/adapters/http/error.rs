//! Error responses for the HTTP adapter.
//!
//! Every handler returns `Result<_, ApiError>`; the status code comes from the
//! engagement error kind and the body is always `{ "code", "message" }`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::domain::engagement::EngagementError;
use crate::domain::foundation::DomainError;

/// Error body returned by every endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Machine-readable error code.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// API error type that converts engagement errors to HTTP responses.
#[derive(Debug)]
pub struct ApiError(pub EngagementError);

impl From<EngagementError> for ApiError {
    fn from(err: EngagementError) -> Self {
        Self(err)
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self(err.into())
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            EngagementError::InvalidParty(_)
            | EngagementError::InvalidTerms { .. }
            | EngagementError::ValidationFailed { .. } => StatusCode::BAD_REQUEST,
            EngagementError::PaymentNotSucceeded { .. } => StatusCode::PAYMENT_REQUIRED,
            EngagementError::Forbidden(_) | EngagementError::NoActiveEngagement { .. } => {
                StatusCode::FORBIDDEN
            }
            EngagementError::NotFound { .. } => StatusCode::NOT_FOUND,
            EngagementError::DuplicateEngagement { .. } | EngagementError::InvalidState { .. } => {
                StatusCode::CONFLICT
            }
            EngagementError::GatewayUnavailable(_) | EngagementError::GatewayRejected(_) => {
                StatusCode::BAD_GATEWAY
            }
            EngagementError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = %status, error = %self.0, "Request failed");
        }

        let body = ErrorResponse::new(self.0.code().to_string(), self.0.message());
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::UserId;

    fn status_of(err: EngagementError) -> StatusCode {
        ApiError(err).status()
    }

    #[test]
    fn client_errors_map_to_4xx() {
        assert_eq!(
            status_of(EngagementError::invalid_party("self")),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(EngagementError::invalid_terms("amount", "too low")),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(EngagementError::validation("name", "empty")),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(EngagementError::payment_not_succeeded("pi_1", "pending")),
            StatusCode::PAYMENT_REQUIRED
        );
        assert_eq!(
            status_of(EngagementError::forbidden("nope")),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status_of(EngagementError::no_active_engagement(
                UserId::new(),
                UserId::new()
            )),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status_of(EngagementError::not_found("diet", "d-1")),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(EngagementError::duplicate_engagement(
                UserId::new(),
                UserId::new()
            )),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(EngagementError::invalid_state("completed", "cancel")),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn infrastructure_errors_map_to_5xx() {
        assert_eq!(
            status_of(EngagementError::gateway_unavailable("timeout")),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_of(EngagementError::GatewayRejected("bad key".to_string())),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_of(EngagementError::store_unavailable("pool")),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn domain_errors_convert_through_engagement_errors() {
        let err: ApiError = DomainError::database("down").into();
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
