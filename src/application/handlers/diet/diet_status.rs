//! DietStatusHandler - Query handler for one diet and its validity.

use std::sync::Arc;

use serde::Serialize;

use crate::application::EngagementGuard;
use crate::domain::diet::{Diet, DietStatusView};
use crate::domain::engagement::EngagementError;
use crate::domain::foundation::{DietId, Timestamp, UserId};
use crate::ports::{Clock, DietRepository};

/// A diet with its clock-relative validity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DietView {
    pub diet: Diet,
    pub validity: DietStatusView,
}

impl DietView {
    pub fn at(diet: Diet, now: Timestamp) -> Self {
        let validity = diet.status_view(now);
        Self { diet, validity }
    }
}

#[derive(Debug, Clone)]
pub struct DietStatusQuery {
    pub diet_id: DietId,
    pub requester_id: UserId,
}

pub struct DietStatusHandler {
    diets: Arc<dyn DietRepository>,
    guard: EngagementGuard,
    clock: Arc<dyn Clock>,
}

impl DietStatusHandler {
    pub fn new(diets: Arc<dyn DietRepository>, guard: EngagementGuard, clock: Arc<dyn Clock>) -> Self {
        Self { diets, guard, clock }
    }

    pub async fn handle(&self, query: DietStatusQuery) -> Result<DietView, EngagementError> {
        let diet = self
            .diets
            .find_by_id(&query.diet_id)
            .await?
            .ok_or_else(|| EngagementError::not_found("diet", query.diet_id))?;

        self.guard
            .authorize_diet_view(&diet, &query.requester_id)
            .await?;

        Ok(DietView::at(diet, self.clock.now()))
    }
}
