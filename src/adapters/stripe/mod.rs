//! Stripe payment gateway adapter.
//!
//! Implements the `PaymentGateway` port with Stripe PaymentIntents:
//! - Authorization creation with idempotency keys
//! - Status retrieval
//! - Webhook signature verification
//!
//! # Security
//!
//! - Webhook signatures use HMAC-SHA256 with constant-time comparison
//! - Timestamps are validated to prevent replay attacks (5-minute window)
//! - All secrets are handled via `secrecy::SecretString`

mod mock_gateway;
mod stripe_gateway;
mod webhook_types;

pub use mock_gateway::MockPaymentGateway;
pub use stripe_gateway::{StripeConfig, StripePaymentGateway};
pub use webhook_types::{SignatureHeader, SignatureParseError, StripePaymentIntent, StripeWebhookEvent};
