//! Payment gateway configuration

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::error::ValidationError;
use crate::adapters::stripe::StripeConfig;
use crate::domain::contract::Currency;

/// Stripe credentials and client settings.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfig {
    /// sk_test_... or sk_live_...
    pub stripe_api_key: SecretString,

    /// whsec_...
    pub stripe_webhook_secret: SecretString,

    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Per-request timeout for gateway calls
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Currency used when a request does not name one
    #[serde(default = "default_currency")]
    pub default_currency: String,
}

impl PaymentConfig {
    pub fn is_test_mode(&self) -> bool {
        self.stripe_api_key.expose_secret().starts_with("sk_test_")
    }

    pub fn is_live_mode(&self) -> bool {
        self.stripe_api_key.expose_secret().starts_with("sk_live_")
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Builds the Stripe adapter configuration.
    pub fn stripe_config(&self) -> StripeConfig {
        StripeConfig::new(
            self.stripe_api_key.expose_secret().clone(),
            self.stripe_webhook_secret.expose_secret().clone(),
        )
        .with_base_url(self.api_base_url.clone())
        .with_timeout(self.request_timeout())
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let api_key = self.stripe_api_key.expose_secret();
        let webhook_secret = self.stripe_webhook_secret.expose_secret();

        if api_key.is_empty() {
            return Err(ValidationError::MissingRequired("STRIPE_API_KEY"));
        }
        if webhook_secret.is_empty() {
            return Err(ValidationError::MissingRequired("STRIPE_WEBHOOK_SECRET"));
        }
        if !api_key.starts_with("sk_") {
            return Err(ValidationError::InvalidStripeKey);
        }
        if !webhook_secret.starts_with("whsec_") {
            return Err(ValidationError::InvalidStripeWebhookSecret);
        }
        if self.request_timeout_secs == 0 || self.request_timeout_secs > 120 {
            return Err(ValidationError::InvalidTimeout);
        }
        Currency::new(&self.default_currency)
            .map_err(|_| ValidationError::InvalidCurrency(self.default_currency.clone()))?;
        Ok(())
    }
}

fn default_api_base_url() -> String {
    "https://api.stripe.com".to_string()
}

fn default_request_timeout() -> u64 {
    10
}

fn default_currency() -> String {
    "usd".to_string()
}
