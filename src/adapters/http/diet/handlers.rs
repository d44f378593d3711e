//! HTTP handlers for diet endpoints.

use axum::body::Bytes;
use axum::extract::{Json, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::adapters::http::error::ApiError;
use crate::adapters::http::extract::{optional_json, parse_id, ApiJson, ApiQuery};
use crate::adapters::http::middleware::RequireUser;
use crate::adapters::http::state::EngagementAppState;
use crate::application::handlers::diet::{
    CreateDietCommand, DietStatusQuery, ListDietsQuery, PauseDietCommand, ReactivateDietCommand,
    ReassignDietCommand, RenewDietCommand, SweepExpirationsCommand,
};
use crate::domain::foundation::DietId;

use super::dto::{
    CreateDietRequest, DietResponse, ListDietsParams, ReassignDietRequest, RenewDietRequest,
    RenewDietResponse, SweepRequest, SweepResponse,
};

// ════════════════════════════════════════════════════════════════════════════════
// Query Handlers (GET endpoints)
// ════════════════════════════════════════════════════════════════════════════════

/// GET /api/diets - Diets of the caller, or of `owner_id` for an engaged nutritionist
pub async fn list_diets(
    State(state): State<EngagementAppState>,
    RequireUser(user_id): RequireUser,
    ApiQuery(params): ApiQuery<ListDietsParams>,
) -> Result<impl IntoResponse, ApiError> {
    let views = state
        .list_diets_handler()
        .handle(ListDietsQuery {
            requester_id: user_id,
            owner_id: params.owner_id,
            status: params.status,
        })
        .await?;

    let response: Vec<DietResponse> = views.into_iter().map(Into::into).collect();
    Ok(Json(response))
}

/// GET /api/diets/:id - One diet with its validity
pub async fn get_diet(
    State(state): State<EngagementAppState>,
    RequireUser(user_id): RequireUser,
    Path(diet_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let diet_id: DietId = parse_id(&diet_id, "diet_id")?;

    let view = state
        .diet_status_handler()
        .handle(DietStatusQuery {
            diet_id,
            requester_id: user_id,
        })
        .await?;

    Ok(Json(DietResponse::from(view)))
}

// ════════════════════════════════════════════════════════════════════════════════
// Command Handlers (POST endpoints)
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/diets - Author a diet for a client
pub async fn create_diet(
    State(state): State<EngagementAppState>,
    RequireUser(user_id): RequireUser,
    ApiJson(request): ApiJson<CreateDietRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let cmd = CreateDietCommand {
        nutritionist_id: user_id,
        owner_id: request.owner_id,
        name: request.name,
        description: request.description,
        objective: request.objective,
        calories: request.calories,
        duration_days: request.duration_days,
        expires_at: request.expires_at,
    };

    let diet = state.create_diet_handler().handle(cmd).await?;

    let response = DietResponse::at(diet, state.clock.now());
    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /api/diets/:id/renew - Supersede a diet with a new one
pub async fn renew_diet(
    State(state): State<EngagementAppState>,
    RequireUser(user_id): RequireUser,
    Path(predecessor_id): Path<String>,
    ApiJson(request): ApiJson<RenewDietRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let predecessor_id: DietId = parse_id(&predecessor_id, "predecessor_id")?;

    let cmd = RenewDietCommand {
        predecessor_id,
        requester_id: user_id,
        name: request.name,
        description: request.description,
        calories: request.calories,
        objective: request.objective,
        duration_days: request.duration_days,
        expires_at: request.expires_at,
    };

    let result = state.renew_diet_handler().handle(cmd).await?;

    let response = RenewDietResponse::at(result, state.clock.now());
    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /api/diets/:id/pause
pub async fn pause_diet(
    State(state): State<EngagementAppState>,
    RequireUser(user_id): RequireUser,
    Path(diet_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let diet_id: DietId = parse_id(&diet_id, "diet_id")?;

    let diet = state
        .pause_diet_handler()
        .handle(PauseDietCommand {
            diet_id,
            requester_id: user_id,
        })
        .await?;

    Ok(Json(DietResponse::at(diet, state.clock.now())))
}

/// POST /api/diets/:id/reactivate
pub async fn reactivate_diet(
    State(state): State<EngagementAppState>,
    RequireUser(user_id): RequireUser,
    Path(diet_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let diet_id: DietId = parse_id(&diet_id, "diet_id")?;

    let diet = state
        .reactivate_diet_handler()
        .handle(ReactivateDietCommand {
            diet_id,
            requester_id: user_id,
        })
        .await?;

    Ok(Json(DietResponse::at(diet, state.clock.now())))
}

/// POST /api/diets/:id/reassign - Move a diet to another client
pub async fn reassign_diet(
    State(state): State<EngagementAppState>,
    RequireUser(user_id): RequireUser,
    Path(diet_id): Path<String>,
    ApiJson(request): ApiJson<ReassignDietRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let diet_id: DietId = parse_id(&diet_id, "diet_id")?;

    let diet = state
        .reassign_diet_handler()
        .handle(ReassignDietCommand {
            diet_id,
            requester_id: user_id,
            new_owner_id: request.new_owner_id,
        })
        .await?;

    Ok(Json(DietResponse::at(diet, state.clock.now())))
}

// ════════════════════════════════════════════════════════════════════════════════
// Maintenance (scheduler-triggered)
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/maintenance/diets/sweep - Expire lapsed diets
///
/// An empty body sweeps every owner.
pub async fn sweep_expirations(
    State(state): State<EngagementAppState>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let owner_id = optional_json::<SweepRequest>(&body)?.and_then(|r| r.owner_id);

    let expired = state
        .sweep_expirations_handler()
        .handle(SweepExpirationsCommand { owner_id })
        .await?;

    Ok(Json(SweepResponse::from(expired)))
}
