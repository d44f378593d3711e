//! PauseDietHandler - Command handler for suspending a diet.

use std::sync::Arc;

use crate::application::{publish_after_commit, EngagementGuard};
use crate::domain::diet::{Diet, DietEvent};
use crate::domain::engagement::EngagementError;
use crate::domain::foundation::{DietId, UserId};
use crate::ports::{Clock, DietRepository, EventPublisher};

#[derive(Debug, Clone)]
pub struct PauseDietCommand {
    pub diet_id: DietId,
    pub requester_id: UserId,
}

pub struct PauseDietHandler {
    diets: Arc<dyn DietRepository>,
    guard: EngagementGuard,
    event_publisher: Arc<dyn EventPublisher>,
    clock: Arc<dyn Clock>,
}

impl PauseDietHandler {
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

    pub async fn handle(&self, cmd: PauseDietCommand) -> Result<Diet, EngagementError> {
        // 1. Find diet
        let mut diet = self
            .diets
            .find_by_id(&cmd.diet_id)
            .await?
            .ok_or_else(|| EngagementError::not_found("diet", cmd.diet_id))?;

        // 2. Only the author, while engaged
        self.guard
            .authorize_diet_action(&diet, &cmd.requester_id)
            .await?;

        // 3. A lapsed window is waiting for a sweep, not a pause
        let now = self.clock.now();
        if diet.needs_expiry(now) {
            return Err(EngagementError::invalid_state("expired", "pause"));
        }
        let expected = diet.status;
        diet.pause(now)?;

        // 4. Persist
        self.diets.update(&diet, expected).await?;
        diet.version += 1;
        tracing::info!(diet_id = %diet.id, by = %cmd.requester_id, "Diet paused");

        // 5. Publish
        let event = DietEvent::Paused {
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
