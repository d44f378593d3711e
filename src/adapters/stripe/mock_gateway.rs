//! Mock payment gateway.
//!
//! Stands in for Stripe in tests and in local runs without credentials.
//! Supports:
//! - Per-authorization status control
//! - Error injection per method
//! - Call tracking
//! - Webhook event simulation

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use crate::ports::{
    AuthorizationStatus, CreateAuthorizationRequest, PaymentAuthorization, PaymentError,
    PaymentGateway, PaymentWebhookEvent,
};

/// Mock payment gateway.
///
/// ```ignore
/// let gateway = MockPaymentGateway::new();
/// let auth = gateway.create_authorization(request).await?;
/// gateway.set_status(&auth.id, AuthorizationStatus::Succeeded);
/// ```
#[derive(Clone, Default)]
pub struct MockPaymentGateway {
    inner: Arc<Mutex<MockState>>,
}

#[derive(Default)]
struct MockState {
    statuses: HashMap<String, AuthorizationStatus>,
    /// Idempotency key to the authorization it produced.
    by_idempotency_key: HashMap<String, PaymentAuthorization>,
    requests: Vec<CreateAuthorizationRequest>,
    method_errors: HashMap<&'static str, PaymentError>,
    call_counts: HashMap<&'static str, usize>,
    next_id: u64,
    blank_ids: bool,
    webhook_verify_mode: WebhookVerifyMode,
}

#[derive(Default, Clone)]
enum WebhookVerifyMode {
    /// Accept any signature; the payload is a JSON `PaymentWebhookEvent`.
    #[default]
    AcceptAll,
    RequireSignature(String),
    AlwaysFail,
}

impl MockPaymentGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// A mock that fails all webhook verifications.
    pub fn rejecting_webhooks() -> Self {
        let mock = Self::new();
        mock.state().webhook_verify_mode = WebhookVerifyMode::AlwaysFail;
        mock
    }

    /// A mock that only accepts webhooks carrying `signature`.
    pub fn requiring_signature(signature: impl Into<String>) -> Self {
        let mock = Self::new();
        mock.state().webhook_verify_mode = WebhookVerifyMode::RequireSignature(signature.into());
        mock
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Configuration
    // ════════════════════════════════════════════════════════════════════════════

    pub fn set_status(&self, authorization_id: &str, status: AuthorizationStatus) {
        self.state()
            .statuses
            .insert(authorization_id.to_string(), status);
    }

    /// Makes `method` fail until cleared. Methods: `create_authorization`,
    /// `get_status`, `verify_webhook`.
    pub fn set_error(&self, method: &'static str, error: PaymentError) {
        self.state().method_errors.insert(method, error);
    }

    /// Subsequent authorizations come back with an empty id.
    pub fn issue_blank_ids(&self) {
        self.state().blank_ids = true;
    }

    pub fn clear_errors(&self) {
        self.state().method_errors.clear();
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Inspection
    // ════════════════════════════════════════════════════════════════════════════

    pub fn call_count(&self, method: &str) -> usize {
        self.state().call_counts.get(method).copied().unwrap_or(0)
    }

    pub fn created_requests(&self) -> Vec<CreateAuthorizationRequest> {
        self.state().requests.clone()
    }

    pub fn status_of(&self, authorization_id: &str) -> Option<AuthorizationStatus> {
        self.state().statuses.get(authorization_id).copied()
    }

    fn begin(&self, method: &'static str) -> Result<MutexGuard<'_, MockState>, PaymentError> {
        let mut state = self.state();
        *state.call_counts.entry(method).or_insert(0) += 1;
        if let Some(error) = state.method_errors.get(method) {
            return Err(error.clone());
        }
        Ok(state)
    }
}

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    async fn create_authorization(
        &self,
        request: CreateAuthorizationRequest,
    ) -> Result<PaymentAuthorization, PaymentError> {
        let mut state = self.begin("create_authorization")?;

        if let Some(key) = &request.idempotency_key {
            if let Some(existing) = state.by_idempotency_key.get(key) {
                return Ok(existing.clone());
            }
        }

        state.next_id += 1;
        let id = if state.blank_ids {
            String::new()
        } else {
            format!("pi_mock_{}", state.next_id)
        };
        let authorization = PaymentAuthorization {
            client_secret: format!("{}_secret_{}", id, request.metadata.contract_id),
            id: id.clone(),
        };

        state.statuses.insert(id, AuthorizationStatus::Pending);
        if let Some(key) = &request.idempotency_key {
            state
                .by_idempotency_key
                .insert(key.clone(), authorization.clone());
        }
        state.requests.push(request);
        Ok(authorization)
    }

    async fn get_status(
        &self,
        authorization_id: &str,
    ) -> Result<AuthorizationStatus, PaymentError> {
        let state = self.begin("get_status")?;
        state
            .statuses
            .get(authorization_id)
            .copied()
            .ok_or_else(|| PaymentError::not_found(&format!("payment intent {}", authorization_id)))
    }

    async fn verify_webhook(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> Result<PaymentWebhookEvent, PaymentError> {
        let state = self.begin("verify_webhook")?;

        match &state.webhook_verify_mode {
            WebhookVerifyMode::AcceptAll => {}
            WebhookVerifyMode::RequireSignature(required) => {
                if signature != required {
                    return Err(PaymentError::invalid_webhook("Invalid signature"));
                }
            }
            WebhookVerifyMode::AlwaysFail => {
                return Err(PaymentError::invalid_webhook("Verification disabled"));
            }
        }

        serde_json::from_slice(payload)
            .map_err(|e| PaymentError::invalid_webhook(format!("Invalid JSON: {}", e)))
    }
}
