//! HTTP adapter for diet endpoints.
//!
//! Exposes the diet lifecycle via REST API:
//! - `GET /api/diets` - List diets with their validity
//! - `POST /api/diets` - Author a diet
//! - `GET /api/diets/:id` - Get one diet
//! - `POST /api/diets/:id/renew` - Renew a diet
//! - `POST /api/diets/:id/pause` / `reactivate` - Pause and resume
//! - `POST /api/diets/:id/reassign` - Move a diet to another client
//! - `POST /api/maintenance/diets/sweep` - Expire lapsed diets

pub mod dto;
pub mod handlers;
pub mod routes;

pub use dto::*;
pub use routes::diet_router;
