//! Request and response DTOs for diet endpoints.

use serde::{Deserialize, Serialize};

use crate::application::handlers::diet::{DietView, RenewDietResult};
use crate::domain::diet::{Diet, DietObjective, DietStatus, DietStatusView};
use crate::domain::foundation::{DietId, Timestamp, UserId};

// ════════════════════════════════════════════════════════════════════════════════
// Requests
// ════════════════════════════════════════════════════════════════════════════════

/// Body of `POST /diets`. The caller is the authoring nutritionist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDietRequest {
    pub owner_id: UserId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub objective: DietObjective,
    pub calories: u32,
    #[serde(default)]
    pub duration_days: Option<u32>,
    #[serde(default)]
    pub expires_at: Option<Timestamp>,
}

/// Body of `POST /diets/:id/renew`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenewDietRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub calories: u32,
    /// Inherited from the predecessor when omitted.
    #[serde(default)]
    pub objective: Option<DietObjective>,
    #[serde(default)]
    pub duration_days: Option<u32>,
    #[serde(default)]
    pub expires_at: Option<Timestamp>,
}

/// Body of `POST /diets/:id/reassign`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReassignDietRequest {
    pub new_owner_id: UserId,
}

/// Query string of `GET /diets`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListDietsParams {
    /// Defaults to the caller.
    pub owner_id: Option<UserId>,
    pub status: Option<DietStatus>,
}

/// Body of `POST /maintenance/diets/sweep`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SweepRequest {
    #[serde(default)]
    pub owner_id: Option<UserId>,
}

// ════════════════════════════════════════════════════════════════════════════════
// Responses
// ════════════════════════════════════════════════════════════════════════════════

/// A diet with its validity at the time of the request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DietResponse {
    pub id: DietId,
    pub owner_id: UserId,
    pub nutritionist_id: UserId,
    pub name: String,
    pub description: String,
    pub objective: DietObjective,
    pub calories: u32,
    pub duration_days: u32,
    pub status: DietStatus,
    pub created_at: Timestamp,
    pub expires_at: Timestamp,
    pub predecessor_id: Option<DietId>,
    pub validity: DietStatusView,
}

impl DietResponse {
    pub fn at(diet: Diet, now: Timestamp) -> Self {
        DietView::at(diet, now).into()
    }
}

impl From<DietView> for DietResponse {
    fn from(view: DietView) -> Self {
        let DietView { diet, validity } = view;
        Self {
            id: diet.id,
            owner_id: diet.owner_id,
            nutritionist_id: diet.nutritionist_id,
            name: diet.content.name,
            description: diet.content.description,
            objective: diet.content.objective,
            calories: diet.content.calories,
            duration_days: diet.duration_days,
            status: diet.status,
            created_at: diet.created_at,
            expires_at: diet.expires_at,
            predecessor_id: diet.predecessor_id,
            validity,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenewDietResponse {
    pub predecessor: DietResponse,
    pub successor: DietResponse,
}

impl RenewDietResponse {
    pub fn at(result: RenewDietResult, now: Timestamp) -> Self {
        Self {
            predecessor: DietResponse::at(result.predecessor, now),
            successor: DietResponse::at(result.successor, now),
        }
    }
}

/// Result of a sweep run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepResponse {
    pub expired: usize,
    pub diet_ids: Vec<DietId>,
}

impl From<Vec<Diet>> for SweepResponse {
    fn from(diets: Vec<Diet>) -> Self {
        Self {
            expired: diets.len(),
            diet_ids: diets.into_iter().map(|d| d.id).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_request_defaults_optional_fields() {
        let json = format!(
            r#"{{"owner_id":"{}","name":"Cut","objective":"definition","calories":1900}}"#,
            UserId::new()
        );
        let request: CreateDietRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(request.objective, DietObjective::Definition);
        assert!(request.description.is_empty());
        assert!(request.duration_days.is_none());
        assert!(request.expires_at.is_none());
    }

    #[test]
    fn renew_request_objective_is_optional() {
        let request: RenewDietRequest =
            serde_json::from_str(r#"{"name":"Phase 2","calories":2100}"#).unwrap();
        assert!(request.objective.is_none());
    }

    #[test]
    fn unknown_objective_is_rejected() {
        let json = format!(
            r#"{{"owner_id":"{}","name":"X","objective":"keto","calories":1900}}"#,
            UserId::new()
        );
        assert!(serde_json::from_str::<CreateDietRequest>(&json).is_err());
    }
}
