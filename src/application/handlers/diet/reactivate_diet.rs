//! ReactivateDietHandler - Command handler for resuming a paused diet.

use std::sync::Arc;

use crate::application::{publish_after_commit, EngagementGuard};
use crate::domain::diet::{Diet, DietEvent, DietStatus};
use crate::domain::engagement::EngagementError;
use crate::domain::foundation::{DietId, UserId};
use crate::ports::{Clock, DietRepository, EventPublisher};

#[derive(Debug, Clone)]
pub struct ReactivateDietCommand {
    pub diet_id: DietId,
    pub requester_id: UserId,
}

pub struct ReactivateDietHandler {
    diets: Arc<dyn DietRepository>,
    guard: EngagementGuard,
    event_publisher: Arc<dyn EventPublisher>,
    clock: Arc<dyn Clock>,
}

impl ReactivateDietHandler {
    pub fn new(
        diets: Arc<dyn DietRepository>,
        guard: EngagementGuard,
        event_publisher: Arc<dyn EventPublisher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            diets,
            guard,
            event_publisher,
            clock,
        }
    }

    /// Reactivating keeps the original window; a diet whose window already
    /// passed is picked up by the next sweep.
    pub async fn handle(&self, cmd: ReactivateDietCommand) -> Result<Diet, EngagementError> {
        let mut diet = self
            .diets
            .find_by_id(&cmd.diet_id)
            .await?
            .ok_or_else(|| EngagementError::not_found("diet", cmd.diet_id))?;

        self.guard
            .authorize_diet_action(&diet, &cmd.requester_id)
            .await?;

        let now = self.clock.now();
        diet.reactivate(now)?;
        self.diets.update(&diet, DietStatus::Paused).await?;
        diet.version += 1;
        tracing::info!(diet_id = %diet.id, by = %cmd.requester_id, "Diet reactivated");

        let event = DietEvent::Reactivated {
            diet_id: diet.id,
            by: cmd.requester_id,
            occurred_at: now,
        };
        publish_after_commit(
            self.event_publisher.as_ref(),
            event.to_envelope().with_user_id(cmd.requester_id.to_string()),
        )
        .await;

        Ok(diet)
    }
}
