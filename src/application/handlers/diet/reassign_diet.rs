//! ReassignDietHandler - Command handler for moving a diet to another client.

use std::sync::Arc;

use crate::application::{publish_after_commit, EngagementGuard};
use crate::domain::diet::{Diet, DietEvent};
use crate::domain::engagement::EngagementError;
use crate::domain::foundation::{DietId, UserId};
use crate::ports::{Clock, DietRepository, EventPublisher};

#[derive(Debug, Clone)]
pub struct ReassignDietCommand {
    pub diet_id: DietId,
    pub requester_id: UserId,
    pub new_owner_id: UserId,
}

pub struct ReassignDietHandler {
    diets: Arc<dyn DietRepository>,
    guard: EngagementGuard,
    event_publisher: Arc<dyn EventPublisher>,
    clock: Arc<dyn Clock>,
}

impl ReassignDietHandler {
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

    pub async fn handle(&self, cmd: ReassignDietCommand) -> Result<Diet, EngagementError> {
        // 1. Find diet
        let mut diet = self
            .diets
            .find_by_id(&cmd.diet_id)
            .await?
            .ok_or_else(|| EngagementError::not_found("diet", cmd.diet_id))?;

        // 2. Reassignment policy against the new owner
        self.guard
            .authorize_reassignment(&diet, &cmd.requester_id, &cmd.new_owner_id)
            .await?;

        // 3. Move it
        let now = self.clock.now();
        let previous_owner_id = diet.owner_id;
        let expected = diet.status;
        diet.reassign(cmd.new_owner_id, now)?;
        self.diets.update(&diet, expected).await?;
        diet.version += 1;

        tracing::info!(
            diet_id = %diet.id,
            previous_owner_id = %previous_owner_id,
            new_owner_id = %diet.owner_id,
            "Diet reassigned"
        );

        // 4. Publish
        let event = DietEvent::Reassigned {
            diet_id: diet.id,
            previous_owner_id,
            new_owner_id: diet.owner_id,
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
