//! Axum router configuration for diet endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{
    create_diet, get_diet, list_diets, pause_diet, reactivate_diet, reassign_diet, renew_diet,
    sweep_expirations,
};
use crate::adapters::http::state::EngagementAppState;

/// Create the diet API router.
///
/// # Routes
///
/// All require `X-User-Id`.
/// - `GET /` - List diets (`?owner_id=&status=`)
/// - `POST /` - Author a diet
/// - `GET /:id` - Get one diet with its validity
/// - `POST /:id/renew` - Renew a diet
/// - `POST /:id/pause` - Pause a diet
/// - `POST /:id/reactivate` - Reactivate a paused diet
/// - `POST /:id/reassign` - Move a diet to another client
pub fn diet_routes() -> Router<EngagementAppState> {
    Router::new()
        .route("/", get(list_diets).post(create_diet))
        .route("/:id", get(get_diet))
        .route("/:id/renew", post(renew_diet))
        .route("/:id/pause", post(pause_diet))
        .route("/:id/reactivate", post(reactivate_diet))
        .route("/:id/reassign", post(reassign_diet))
}

/// Create the diet maintenance router, meant for an internal scheduler.
///
/// # Routes
/// - `POST /sweep` - Expire lapsed diets
pub fn diet_maintenance_routes() -> Router<EngagementAppState> {
    Router::new().route("/sweep", post(sweep_expirations))
}

/// Combine the diet and maintenance routers for mounting under `/api`.
pub fn diet_router() -> Router<EngagementAppState> {
    Router::new()
        .nest("/diets", diet_routes())
        .nest("/maintenance/diets", diet_maintenance_routes())
}
