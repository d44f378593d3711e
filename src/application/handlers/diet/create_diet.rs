//! CreateDietHandler - Command handler for authoring a diet.

use std::sync::Arc;

use crate::application::{publish_after_commit, EngagementGuard};
use crate::domain::diet::{Diet, DietContent, DietEvent, DietLimits, DietObjective};
use crate::domain::engagement::EngagementError;
use crate::domain::foundation::{DietId, Timestamp, UserId};
use crate::ports::{Clock, DietRepository, EventPublisher};

use super::requested_window;

/// Command to create a diet for a client.
#[derive(Debug, Clone)]
pub struct CreateDietCommand {
    /// The authoring nutritionist.
    pub nutritionist_id: UserId,
    pub owner_id: UserId,
    pub name: String,
    pub description: String,
    pub objective: DietObjective,
    pub calories: u32,
    /// Defaults to 30 days.
    pub duration_days: Option<u32>,
    /// Explicit expiry overriding `duration_days`.
    pub expires_at: Option<Timestamp>,
}

/// Handler for creating diets.
pub struct CreateDietHandler {
    diets: Arc<dyn DietRepository>,
    guard: EngagementGuard,
    event_publisher: Arc<dyn EventPublisher>,
    clock: Arc<dyn Clock>,
    limits: DietLimits,
    cap_to_contract_end: bool,
}

impl CreateDietHandler {
    pub fn new(
        diets: Arc<dyn DietRepository>,
        guard: EngagementGuard,
        event_publisher: Arc<dyn EventPublisher>,
        clock: Arc<dyn Clock>,
        limits: DietLimits,
        cap_to_contract_end: bool,
    ) -> Self {
        Self {
            diets,
            guard,
            event_publisher,
            clock,
            limits,
            cap_to_contract_end,
        }
    }

    pub async fn handle(&self, cmd: CreateDietCommand) -> Result<Diet, EngagementError> {
        // 1. Validate content
        let content = DietContent::new(&cmd.name, &cmd.description, cmd.objective, cmd.calories)?;

        // 2. Require an active contract with the client
        let contract = self
            .guard
            .authorize_authoring(&cmd.nutritionist_id, &cmd.owner_id)
            .await?;

        // 3. Build the diet
        let now = self.clock.now();
        let mut diet = Diet::create(
            DietId::new(),
            cmd.owner_id,
            cmd.nutritionist_id,
            content,
            requested_window(cmd.duration_days, cmd.expires_at),
            &self.limits,
            now,
        )?;
        if self.cap_to_contract_end {
            if let Some(ends_at) = contract.ends_at {
                diet.cap_expiry(ends_at);
            }
        }

        // 4. Persist
        self.diets.insert(&diet).await?;
        tracing::info!(
            diet_id = %diet.id,
            owner_id = %diet.owner_id,
            nutritionist_id = %diet.nutritionist_id,
            expires_at = %diet.expires_at,
            "Diet created"
        );

        // 5. Publish
        let event = DietEvent::Created {
            diet_id: diet.id,
            owner_id: diet.owner_id,
            nutritionist_id: diet.nutritionist_id,
            expires_at: diet.expires_at,
            occurred_at: now,
        };
        publish_after_commit(
            self.event_publisher.as_ref(),
            event.to_envelope().with_user_id(cmd.nutritionist_id.to_string()),
        )
        .await;

        Ok(diet)
    }
}
