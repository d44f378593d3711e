//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `postgres` - Contract, diet and party persistence (sqlx)
//! - `memory` - In-memory persistence for tests and local runs
//! - `stripe` - Payment gateway (PaymentIntents, webhooks)
//! - `events` - Event publishers (in-memory bus, tracing)
//! - `clock` - System and manual clocks
//! - `http` - REST API (axum)

pub mod clock;
pub mod events;
pub mod http;
pub mod memory;
pub mod postgres;
pub mod stripe;

pub use clock::{ManualClock, SystemClock};
pub use events::{InMemoryEventBus, TracingEventPublisher};
