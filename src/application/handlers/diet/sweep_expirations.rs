//! SweepExpirationsHandler - Command handler for expiring lapsed diets.
//!
//! Safe to run repeatedly and concurrently: each diet is written with a
//! compare-and-set from `active`, so a diet is expired at most once.

use std::sync::Arc;

use crate::application::publish_after_commit;
use crate::domain::diet::{Diet, DietEvent, DietStatus};
use crate::domain::engagement::EngagementError;
use crate::domain::foundation::{ErrorCode, Timestamp, UserId};
use crate::ports::{Clock, DietRepository, EventPublisher};

/// Command to expire lapsed diets of one owner, or of everyone.
#[derive(Debug, Clone, Default)]
pub struct SweepExpirationsCommand {
    pub owner_id: Option<UserId>,
}

pub struct SweepExpirationsHandler {
    diets: Arc<dyn DietRepository>,
    event_publisher: Arc<dyn EventPublisher>,
    clock: Arc<dyn Clock>,
}

impl SweepExpirationsHandler {
    pub fn new(
        diets: Arc<dyn DietRepository>,
        event_publisher: Arc<dyn EventPublisher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            diets,
            event_publisher,
            clock,
        }
    }

    /// Returns the diets this run expired.
    pub async fn handle(&self, cmd: SweepExpirationsCommand) -> Result<Vec<Diet>, EngagementError> {
        expire_lapsed(
            self.diets.as_ref(),
            self.event_publisher.as_ref(),
            cmd.owner_id.as_ref(),
            self.clock.now(),
        )
        .await
    }
}

pub(crate) async fn expire_lapsed(
    diets: &dyn DietRepository,
    event_publisher: &dyn EventPublisher,
    owner_id: Option<&UserId>,
    now: Timestamp,
) -> Result<Vec<Diet>, EngagementError> {
    let lapsed = diets.find_lapsed(owner_id, now).await?;
    let mut expired = Vec::with_capacity(lapsed.len());

    for mut diet in lapsed {
        if diet.expire(now).is_err() {
            continue;
        }
        match diets.update(&diet, DietStatus::Active).await {
            Ok(()) => diet.version += 1,
            Err(e) if matches!(e.code, ErrorCode::ConcurrentModification | ErrorCode::DietNotFound) => {
                tracing::debug!(diet_id = %diet.id, "Diet changed during sweep, skipping");
                continue;
            }
            Err(e) => {
                tracing::error!(diet_id = %diet.id, error = %e, "Failed to expire diet");
                return Err(e.into());
            }
        }

        tracing::info!(diet_id = %diet.id, owner_id = %diet.owner_id, "Diet expired");
        let event = DietEvent::Expired {
            diet_id: diet.id,
            owner_id: diet.owner_id,
            occurred_at: now,
        };
        publish_after_commit(event_publisher, event.to_envelope()).await;
        expired.push(diet);
    }

    Ok(expired)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::Fixture;

    fn handler(fx: &Fixture) -> SweepExpirationsHandler {
        SweepExpirationsHandler::new(fx.diets.clone(), fx.events.clone(), fx.clock.clone())
    }

    #[tokio::test]
    async fn expires_only_lapsed_active_diets() {
        let fx = Fixture::new();
        let old = fx.diet(fx.client, fx.nutritionist).await;
        fx.clock.advance_days(10);
        let fresh = fx
            .diet_created_at(fx.client, fx.nutritionist, fx.now())
            .await;
        fx.clock.advance_days(21);

        let expired = handler(&fx)
            .handle(SweepExpirationsCommand::default())
            .await
            .unwrap();

        assert_eq!(expired.len(), 1);
        assert_eq!(expired[0].id, old.id);
        assert_eq!(expired[0].status, DietStatus::Expired);
        let untouched = fx.diets.find_by_id(&fresh.id).await.unwrap().unwrap();
        assert_eq!(untouched.status, DietStatus::Active);
    }

    #[tokio::test]
    async fn running_twice_expires_once() {
        let fx = Fixture::new();
        fx.diet(fx.client, fx.nutritionist).await;
        fx.clock.advance_days(31);
        let handler = handler(&fx);

        assert_eq!(handler.handle(SweepExpirationsCommand::default()).await.unwrap().len(), 1);
        assert!(handler.handle(SweepExpirationsCommand::default()).await.unwrap().is_empty());
        assert_eq!(fx.events.events_of_type("diet.expired.v1").len(), 1);
    }

    #[tokio::test]
    async fn scoped_to_owner() {
        let fx = Fixture::new();
        let other = fx.add_client("Bo").await;
        fx.diet(fx.client, fx.nutritionist).await;
        let others = fx.diet(other, fx.nutritionist).await;
        fx.clock.advance_days(31);

        let expired = handler(&fx)
            .handle(SweepExpirationsCommand {
                owner_id: Some(fx.client),
            })
            .await
            .unwrap();

        assert_eq!(expired.len(), 1);
        let stored = fx.diets.find_by_id(&others.id).await.unwrap().unwrap();
        assert_eq!(stored.status, DietStatus::Active);
    }

    #[tokio::test]
    async fn paused_diets_are_left_alone() {
        let fx = Fixture::new();
        let mut diet = fx.diet(fx.client, fx.nutritionist).await;
        diet.pause(fx.now()).unwrap();
        fx.diets.update(&diet, DietStatus::Active).await.unwrap();
        fx.clock.advance_days(40);

        let expired = handler(&fx)
            .handle(SweepExpirationsCommand::default())
            .await
            .unwrap();
        assert!(expired.is_empty());
    }
}
