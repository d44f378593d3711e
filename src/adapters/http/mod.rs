//! HTTP adapters - REST API implementations.
//!
//! Each domain area has its own HTTP adapter for endpoint exposure; `api_router`
//! mounts them under `/api` and applies the cross-cutting layers.

pub mod contract;
pub mod diet;
pub mod error;
pub mod extract;
pub mod middleware;
mod state;

use std::time::Duration;

use axum::http::{header, HeaderName, HeaderValue, Method};
use axum::routing::get;
use axum::{Json, Router};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;

pub use contract::contract_router;
pub use diet::diet_router;
pub use error::{ApiError, ErrorResponse};
pub use state::EngagementAppState;

/// Build the complete application router.
///
/// # Routes
/// - `GET /health` - Liveness probe
/// - `/api/contracts`, `/api/webhooks`, `/api/maintenance/contracts`
/// - `/api/diets`, `/api/maintenance/diets`
pub fn api_router(state: EngagementAppState, server: &ServerConfig) -> Router {
    let api = Router::new()
        .merge(contract_router())
        .merge(diet_router());

    Router::new()
        .route("/health", get(health))
        .nest("/api", api)
        .with_state(state)
        .layer(TimeoutLayer::new(Duration::from_secs(
            server.request_timeout_secs,
        )))
        .layer(cors_layer(server))
        .layer(TraceLayer::new_for_http())
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Configured origins only; any origin outside production when none are set.
fn cors_layer(server: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = server
        .cors_origins_list()
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();

    let allow_origin = if !origins.is_empty() {
        AllowOrigin::list(origins)
    } else if server.is_production() {
        AllowOrigin::list(Vec::<HeaderValue>::new())
    } else {
        AllowOrigin::any()
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            header::CONTENT_TYPE,
            header::ACCEPT,
            HeaderName::from_static("x-user-id"),
        ])
}
