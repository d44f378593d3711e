//! Nutrilink - client and nutritionist engagement service.
//!
//! Clients open paid contracts with verified nutritionists; while a contract
//! binds them, the nutritionist authors diet plans with expiring validity
//! windows for the client.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
