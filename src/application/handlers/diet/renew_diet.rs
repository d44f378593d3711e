//! RenewDietHandler - Command handler for replacing a diet with its successor.
//!
//! The predecessor is superseded and the successor inserted in one store
//! call; neither write is visible without the other.

use std::sync::Arc;

use crate::application::{publish_after_commit, EngagementGuard};
use crate::domain::diet::{Diet, DietContent, DietEvent, DietLimits, DietObjective};
use crate::domain::engagement::EngagementError;
use crate::domain::foundation::{DietId, Timestamp, UserId};
use crate::ports::{Clock, DietRepository, EventPublisher};

use super::requested_window;

/// Command to renew a diet.
#[derive(Debug, Clone)]
pub struct RenewDietCommand {
    pub predecessor_id: DietId,
    /// The nutritionist authoring the successor.
    pub requester_id: UserId,
    pub name: String,
    pub description: String,
    pub calories: u32,
    /// Inherited from the predecessor when not given.
    pub objective: Option<DietObjective>,
    /// Defaults to 30 days.
    pub duration_days: Option<u32>,
    pub expires_at: Option<Timestamp>,
}

#[derive(Debug, Clone)]
pub struct RenewDietResult {
    /// Now superseded.
    pub predecessor: Diet,
    pub successor: Diet,
}

/// Handler for renewing diets.
pub struct RenewDietHandler {
    diets: Arc<dyn DietRepository>,
    guard: EngagementGuard,
    event_publisher: Arc<dyn EventPublisher>,
    clock: Arc<dyn Clock>,
    limits: DietLimits,
    cap_to_contract_end: bool,
}

impl RenewDietHandler {
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

    pub async fn handle(&self, cmd: RenewDietCommand) -> Result<RenewDietResult, EngagementError> {
        // 1. Find predecessor
        let mut predecessor = self
            .diets
            .find_by_id(&cmd.predecessor_id)
            .await?
            .ok_or_else(|| EngagementError::not_found("diet", cmd.predecessor_id))?;

        // 2. Validate content
        let objective = cmd.objective.unwrap_or(predecessor.content.objective);
        let content = DietContent::new(&cmd.name, &cmd.description, objective, cmd.calories)?;

        // 3. Check the engagement with the owner
        let governing = self
            .guard
            .authorize_renewal(&cmd.requester_id, &predecessor.owner_id)
            .await?;

        // 4. Build successor; predecessor becomes superseded in memory only
        let now = self.clock.now();
        let expected = predecessor.status;
        let mut successor = predecessor.renew(
            DietId::new(),
            cmd.requester_id,
            content,
            requested_window(cmd.duration_days, cmd.expires_at),
            &self.limits,
            now,
        )?;
        if self.cap_to_contract_end {
            if let Some(ends_at) = governing.and_then(|c| c.ends_at) {
                successor.cap_expiry(ends_at);
            }
        }

        // 5. Persist both rows atomically
        self.diets
            .save_renewal(&predecessor, expected, &successor)
            .await?;
        predecessor.version += 1;

        tracing::info!(
            predecessor_id = %predecessor.id,
            successor_id = %successor.id,
            owner_id = %successor.owner_id,
            "Diet renewed"
        );

        // 6. Publish
        let event = DietEvent::Renewed {
            diet_id: successor.id,
            predecessor_id: predecessor.id,
            owner_id: successor.owner_id,
            expires_at: successor.expires_at,
            occurred_at: now,
        };
        publish_after_commit(
            self.event_publisher.as_ref(),
            event.to_envelope().with_user_id(cmd.requester_id.to_string()),
        )
        .await;

        Ok(RenewDietResult {
            predecessor,
            successor,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::{t0, Fixture};
    use crate::domain::diet::DietStatus;
    use crate::domain::engagement::EngagementPolicy;

    fn handler(fx: &Fixture) -> RenewDietHandler {
        handler_with(fx, EngagementPolicy::default())
    }

    fn handler_with(fx: &Fixture, policy: EngagementPolicy) -> RenewDietHandler {
        RenewDietHandler::new(
            fx.diets.clone(),
            fx.guard_with(policy),
            fx.events.clone(),
            fx.clock.clone(),
            DietLimits::default(),
            false,
        )
    }

    fn command(predecessor: &Diet, requester: UserId) -> RenewDietCommand {
        RenewDietCommand {
            predecessor_id: predecessor.id,
            requester_id: requester,
            name: "Cutting plan, phase 2".to_string(),
            description: "Lower carbs".to_string(),
            calories: 1_700,
            objective: None,
            duration_days: None,
            expires_at: None,
        }
    }

    #[tokio::test]
    async fn successor_replaces_predecessor() {
        let fx = Fixture::new();
        fx.active_contract(fx.client, fx.nutritionist).await;
        let original = fx.diet(fx.client, fx.nutritionist).await;
        fx.clock.advance_days(28);

        let result = handler(&fx)
            .handle(command(&original, fx.nutritionist))
            .await
            .unwrap();

        assert_eq!(result.successor.predecessor_id, Some(original.id));
        assert_eq!(result.successor.status, DietStatus::Active);
        assert_eq!(result.successor.owner_id, fx.client);
        assert_eq!(result.successor.content.objective, original.content.objective);
        assert_eq!(result.successor.expires_at, t0().add_days(58));

        let stored = fx.diets.find_by_id(&original.id).await.unwrap().unwrap();
        assert_eq!(stored.status, DietStatus::Superseded);
        assert_eq!(stored, result.predecessor);
        assert!(fx.events.has_event("diet.renewed.v1"));
    }

    #[tokio::test]
    async fn exactly_one_of_the_pair_is_active() {
        let fx = Fixture::new();
        fx.active_contract(fx.client, fx.nutritionist).await;
        let original = fx.diet(fx.client, fx.nutritionist).await;

        handler(&fx)
            .handle(command(&original, fx.nutritionist))
            .await
            .unwrap();

        let diets = fx.diets.find_by_owner(&fx.client, None).await.unwrap();
        let active = diets.iter().filter(|d| d.status == DietStatus::Active).count();
        let superseded = diets
            .iter()
            .filter(|d| d.status == DietStatus::Superseded)
            .count();
        assert_eq!((active, superseded), (1, 1));
    }

    #[tokio::test]
    async fn expired_predecessor_can_be_renewed() {
        let fx = Fixture::new();
        fx.active_contract(fx.client, fx.nutritionist).await;
        let mut original = fx.diet(fx.client, fx.nutritionist).await;
        fx.clock.advance_days(31);
        original.expire(t0().add_days(31)).unwrap();
        fx.diets
            .update(&original, DietStatus::Active)
            .await
            .unwrap();
        original.version += 1;

        let result = handler(&fx)
            .handle(command(&original, fx.nutritionist))
            .await
            .unwrap();
        assert_eq!(result.predecessor.status, DietStatus::Superseded);
    }

    #[tokio::test]
    async fn superseded_predecessor_is_rejected() {
        let fx = Fixture::new();
        fx.active_contract(fx.client, fx.nutritionist).await;
        let original = fx.diet(fx.client, fx.nutritionist).await;
        let handler = handler(&fx);
        handler
            .handle(command(&original, fx.nutritionist))
            .await
            .unwrap();

        let err = handler
            .handle(command(&original, fx.nutritionist))
            .await
            .unwrap_err();
        assert!(matches!(err, EngagementError::InvalidState { .. }));
        assert_eq!(fx.diets.len().await, 2);
    }

    #[tokio::test]
    async fn missing_predecessor_is_not_found() {
        let fx = Fixture::new();
        let ghost = Diet::create(
            DietId::new(),
            fx.client,
            fx.nutritionist,
            crate::application::test_support::content("Ghost"),
            Default::default(),
            &DietLimits::default(),
            t0(),
        )
        .unwrap();

        let err = handler(&fx)
            .handle(command(&ghost, fx.nutritionist))
            .await
            .unwrap_err();
        assert!(matches!(err, EngagementError::NotFound { resource: "diet", .. }));
    }

    #[tokio::test]
    async fn requires_active_contract_by_default() {
        let fx = Fixture::new();
        fx.pending_contract(fx.client, fx.nutritionist).await;
        let original = fx.diet(fx.client, fx.nutritionist).await;

        let err = handler(&fx)
            .handle(command(&original, fx.nutritionist))
            .await
            .unwrap_err();
        assert!(matches!(err, EngagementError::NoActiveEngagement { .. }));

        let relaxed = handler_with(
            &fx,
            EngagementPolicy {
                require_active_contract_for_renewal: false,
                ..EngagementPolicy::default()
            },
        );
        assert!(relaxed
            .handle(command(&original, fx.nutritionist))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn failed_write_leaves_predecessor_active() {
        let fx = Fixture::new();
        fx.active_contract(fx.client, fx.nutritionist).await;
        let original = fx.diet(fx.client, fx.nutritionist).await;
        fx.diets.set_fail_writes(true);

        let err = handler(&fx)
            .handle(command(&original, fx.nutritionist))
            .await
            .unwrap_err();

        assert!(matches!(err, EngagementError::StoreUnavailable(_)));
        let stored = fx.diets.find_by_id(&original.id).await.unwrap().unwrap();
        assert_eq!(stored.status, DietStatus::Active);
        assert_eq!(fx.diets.len().await, 1);
    }
}
