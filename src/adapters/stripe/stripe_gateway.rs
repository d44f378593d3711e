//! Stripe payment gateway.
//!
//! Authorizations are Stripe PaymentIntents. The contract id travels in the
//! intent metadata so webhook events can be tied back to a contract.
//!
//! # Security
//!
//! - HMAC-SHA256 signature verification with constant-time comparison
//! - Timestamp validation (5-minute window) for replay protection
//! - Secrets held in `secrecy::SecretString`
//!
//! ```ignore
//! let config = StripeConfig::new(api_key, webhook_secret);
//! let gateway = StripePaymentGateway::new(config)?;
//! ```

use std::time::Duration;

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::domain::foundation::ContractId;
use crate::ports::{
    AuthorizationStatus, CreateAuthorizationRequest, PaymentAuthorization, PaymentError,
    PaymentErrorCode, PaymentGateway, PaymentWebhookEvent, PaymentWebhookEventType,
};

use super::webhook_types::{
    hex_encode, SignatureHeader, StripeErrorBody, StripePaymentIntent, StripeWebhookEvent,
};

type HmacSha256 = Hmac<Sha256>;

/// Maximum age for webhook events (5 minutes).
const MAX_TIMESTAMP_AGE_SECS: i64 = 300;

/// Clock skew tolerance for future timestamps (60 seconds).
const MAX_FUTURE_TOLERANCE_SECS: i64 = 60;

const PAYMENT_INTENT_PREFIX: &str = "pi_";

/// Stripe API configuration.
#[derive(Clone)]
pub struct StripeConfig {
    /// sk_live_... or sk_test_...
    api_key: SecretString,
    /// whsec_...
    webhook_secret: SecretString,
    api_base_url: String,
    timeout: Duration,
}

impl StripeConfig {
    pub fn new(api_key: impl Into<String>, webhook_secret: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::new(api_key.into()),
            webhook_secret: SecretString::new(webhook_secret.into()),
            api_base_url: "https://api.stripe.com".to_string(),
            timeout: Duration::from_secs(10),
        }
    }

    /// Set a custom API base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl std::fmt::Debug for StripeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripeConfig")
            .field("api_base_url", &self.api_base_url)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

/// Stripe implementation of `PaymentGateway`.
pub struct StripePaymentGateway {
    config: StripeConfig,
    http_client: reqwest::Client,
}

impl StripePaymentGateway {
    pub fn new(config: StripeConfig) -> Result<Self, PaymentError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| PaymentError::provider(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            config,
            http_client,
        })
    }

    /// Checks the signature against the given current time.
    fn verify_signature(
        &self,
        payload: &[u8],
        header: &SignatureHeader,
        now: i64,
    ) -> Result<(), PaymentError> {
        let age = now - header.timestamp;

        if age > MAX_TIMESTAMP_AGE_SECS {
            tracing::warn!(
                event_timestamp = header.timestamp,
                current_time = now,
                age_secs = age,
                "Webhook event too old - possible replay attack"
            );
            return Err(PaymentError::invalid_webhook(format!(
                "Event too old ({} seconds)",
                age
            )));
        }

        if age < -MAX_FUTURE_TOLERANCE_SECS {
            tracing::warn!(
                event_timestamp = header.timestamp,
                current_time = now,
                "Webhook event from future - clock skew or manipulation"
            );
            return Err(PaymentError::invalid_webhook("Event timestamp in future"));
        }

        let expected = sign(
            self.config.webhook_secret.expose_secret().as_bytes(),
            header.timestamp,
            payload,
        )?;

        let matched = header
            .v1_signatures
            .iter()
            .any(|provided| expected.as_slice().ct_eq(provided.as_slice()).unwrap_u8() == 1);
        if !matched {
            tracing::warn!(
                expected_signature = hex_encode(&expected),
                "Invalid webhook signature"
            );
            return Err(PaymentError::invalid_webhook("Invalid signature"));
        }

        Ok(())
    }

    fn parse_event(&self, payload: &[u8]) -> Result<PaymentWebhookEvent, PaymentError> {
        let stripe_event: StripeWebhookEvent = serde_json::from_slice(payload).map_err(|e| {
            tracing::warn!(error = %e, "Failed to parse webhook payload");
            PaymentError::invalid_webhook(format!("Invalid JSON: {}", e))
        })?;

        let event_type = match stripe_event.event_type.as_str() {
            "payment_intent.succeeded" => PaymentWebhookEventType::AuthorizationSucceeded,
            "payment_intent.payment_failed" | "payment_intent.canceled" => {
                PaymentWebhookEventType::AuthorizationFailed
            }
            other => PaymentWebhookEventType::Unknown(other.to_string()),
        };

        let (authorization_id, contract_id) = match event_type {
            PaymentWebhookEventType::Unknown(_) => (None, None),
            _ => {
                let intent: StripePaymentIntent =
                    serde_json::from_value(stripe_event.data.object.clone()).map_err(|e| {
                        PaymentError::invalid_webhook(format!("Invalid payment intent: {}", e))
                    })?;
                let contract_id = intent
                    .metadata
                    .get("contract_id")
                    .and_then(|raw| raw.parse::<ContractId>().ok());
                (Some(intent.id), contract_id)
            }
        };

        Ok(PaymentWebhookEvent {
            id: stripe_event.id,
            event_type,
            authorization_id,
            contract_id,
            created_at: stripe_event.created,
        })
    }

    async fn read_intent(response: reqwest::Response) -> Result<StripePaymentIntent, PaymentError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, error = %body, "Stripe request failed");
            return Err(error_from_response(status, &body));
        }
        response.json().await.map_err(|e| {
            PaymentError::provider(format!("Failed to parse Stripe response: {}", e))
        })
    }
}

fn sign(secret: &[u8], timestamp: i64, payload: &[u8]) -> Result<Vec<u8>, PaymentError> {
    let mut mac = HmacSha256::new_from_slice(secret)
        .map_err(|e| PaymentError::provider(format!("Invalid webhook secret: {}", e)))?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    Ok(mac.finalize().into_bytes().to_vec())
}

fn transport_error(err: reqwest::Error) -> PaymentError {
    if err.is_timeout() {
        PaymentError::timeout(err.to_string())
    } else {
        PaymentError::network(err.to_string())
    }
}

fn error_from_response(status: reqwest::StatusCode, body: &str) -> PaymentError {
    let parsed = serde_json::from_str::<StripeErrorBody>(body).ok();
    let message = parsed
        .as_ref()
        .and_then(|b| b.error.message.clone())
        .unwrap_or_else(|| format!("Stripe API error ({})", status));

    let code = match status.as_u16() {
        401 | 403 => PaymentErrorCode::AuthenticationError,
        404 => PaymentErrorCode::NotFound,
        429 => PaymentErrorCode::RateLimitExceeded,
        400..=499 => PaymentErrorCode::InvalidRequest,
        _ => PaymentErrorCode::ProviderError,
    };

    let error = PaymentError::new(code, message);
    match parsed.and_then(|b| b.error.code.or(b.error.error_type)) {
        Some(provider_code) => error.with_provider_code(provider_code),
        None => error,
    }
}

/// Collapses PaymentIntent statuses to what the core acts on.
fn map_intent_status(status: &str) -> AuthorizationStatus {
    match status {
        "succeeded" => AuthorizationStatus::Succeeded,
        "canceled" => AuthorizationStatus::Failed,
        _ => AuthorizationStatus::Pending,
    }
}

#[async_trait]
impl PaymentGateway for StripePaymentGateway {
    async fn create_authorization(
        &self,
        request: CreateAuthorizationRequest,
    ) -> Result<PaymentAuthorization, PaymentError> {
        let url = format!("{}/v1/payment_intents", self.config.api_base_url);
        let metadata = &request.metadata;

        let params = vec![
            ("amount", request.amount.cents().to_string()),
            ("currency", request.currency.as_str().to_string()),
            ("description", request.description.clone()),
            ("payment_method_types[]", "card".to_string()),
            ("metadata[contract_id]", metadata.contract_id.to_string()),
            ("metadata[client_id]", metadata.client_id.to_string()),
            ("metadata[nutritionist_id]", metadata.nutritionist_id.to_string()),
            ("metadata[duration_months]", metadata.duration_months.to_string()),
        ];

        let mut builder = self
            .http_client
            .post(&url)
            .basic_auth(self.config.api_key.expose_secret(), Option::<&str>::None)
            .form(&params);
        if let Some(key) = &request.idempotency_key {
            builder = builder.header("Idempotency-Key", key);
        }

        let response = builder.send().await.map_err(transport_error)?;
        let intent = Self::read_intent(response).await?;

        let client_secret = intent.client_secret.ok_or_else(|| {
            PaymentError::provider("PaymentIntent response is missing client_secret")
        })?;

        tracing::info!(
            authorization_id = %intent.id,
            contract_id = %metadata.contract_id,
            amount = request.amount.cents(),
            "Created Stripe payment intent"
        );

        Ok(PaymentAuthorization {
            id: intent.id,
            client_secret,
        })
    }

    async fn get_status(
        &self,
        authorization_id: &str,
    ) -> Result<AuthorizationStatus, PaymentError> {
        if !authorization_id.starts_with(PAYMENT_INTENT_PREFIX) {
            return Err(PaymentError::not_found(&format!(
                "payment intent {}",
                authorization_id
            )));
        }

        let url = format!(
            "{}/v1/payment_intents/{}",
            self.config.api_base_url, authorization_id
        );
        let response = self
            .http_client
            .get(&url)
            .basic_auth(self.config.api_key.expose_secret(), Option::<&str>::None)
            .send()
            .await
            .map_err(transport_error)?;

        let intent = Self::read_intent(response).await?;
        Ok(map_intent_status(&intent.status))
    }

    async fn verify_webhook(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> Result<PaymentWebhookEvent, PaymentError> {
        let header = SignatureHeader::parse(signature).map_err(|e| {
            tracing::warn!(error = %e, "Invalid Stripe-Signature header");
            PaymentError::invalid_webhook(e.to_string())
        })?;

        self.verify_signature(payload, &header, chrono::Utc::now().timestamp())?;
        self.parse_event(payload)
    }
}
