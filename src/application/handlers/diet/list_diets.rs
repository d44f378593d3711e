//! ListDietsHandler - Query handler for a client's diets.
//!
//! With `sweep_on_read`, lapsed diets of the owner are expired before the
//! listing is read, so stored status and validity agree.

use std::sync::Arc;

use crate::application::EngagementGuard;
use crate::domain::diet::DietStatus;
use crate::domain::engagement::EngagementError;
use crate::domain::foundation::UserId;
use crate::ports::{Clock, DietRepository, EventPublisher};

use super::diet_status::DietView;
use super::sweep_expirations::expire_lapsed;

#[derive(Debug, Clone)]
pub struct ListDietsQuery {
    pub requester_id: UserId,
    /// Defaults to the requester.
    pub owner_id: Option<UserId>,
    pub status: Option<DietStatus>,
}

pub struct ListDietsHandler {
    diets: Arc<dyn DietRepository>,
    guard: EngagementGuard,
    event_publisher: Arc<dyn EventPublisher>,
    clock: Arc<dyn Clock>,
    sweep_on_read: bool,
}

impl ListDietsHandler {
    pub fn new(
        diets: Arc<dyn DietRepository>,
        guard: EngagementGuard,
        event_publisher: Arc<dyn EventPublisher>,
        clock: Arc<dyn Clock>,
        sweep_on_read: bool,
    ) -> Self {
        Self {
            diets,
            guard,
            event_publisher,
            clock,
            sweep_on_read,
        }
    }

    /// Newest first.
    pub async fn handle(&self, query: ListDietsQuery) -> Result<Vec<DietView>, EngagementError> {
        let owner_id = query.owner_id.unwrap_or(query.requester_id);
        self.guard
            .authorize_owner_listing(&owner_id, &query.requester_id)
            .await?;

        let now = self.clock.now();
        if self.sweep_on_read {
            expire_lapsed(
                self.diets.as_ref(),
                self.event_publisher.as_ref(),
                Some(&owner_id),
                now,
            )
            .await?;
        }

        let diets = self.diets.find_by_owner(&owner_id, query.status).await?;
        Ok(diets.into_iter().map(|d| DietView::at(d, now)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::Fixture;

    fn handler(fx: &Fixture, sweep_on_read: bool) -> ListDietsHandler {
        ListDietsHandler::new(
            fx.diets.clone(),
            fx.guard(),
            fx.events.clone(),
            fx.clock.clone(),
            sweep_on_read,
        )
    }

    fn own(fx: &Fixture) -> ListDietsQuery {
        ListDietsQuery {
            requester_id: fx.client,
            owner_id: None,
            status: None,
        }
    }

    #[tokio::test]
    async fn owner_lists_own_diets_newest_first() {
        let fx = Fixture::new();
        let older = fx.diet(fx.client, fx.nutritionist).await;
        fx.clock.advance_days(1);
        let newer = fx
            .diet_created_at(fx.client, fx.nutritionist, fx.now())
            .await;

        let listed = handler(&fx, true).handle(own(&fx)).await.unwrap();

        let ids: Vec<_> = listed.iter().map(|v| v.diet.id).collect();
        assert_eq!(ids, vec![newer.id, older.id]);
    }

    #[tokio::test]
    async fn sweep_on_read_expires_lapsed() {
        let fx = Fixture::new();
        fx.diet(fx.client, fx.nutritionist).await;
        fx.clock.advance_days(31);

        let listed = handler(&fx, true).handle(own(&fx)).await.unwrap();

        assert_eq!(listed[0].diet.status, DietStatus::Expired);
        assert!(listed[0].validity.is_expired);
        assert!(fx.events.has_event("diet.expired.v1"));
    }

    #[tokio::test]
    async fn without_sweep_status_is_derived_only() {
        let fx = Fixture::new();
        fx.diet(fx.client, fx.nutritionist).await;
        fx.clock.advance_days(31);

        let listed = handler(&fx, false).handle(own(&fx)).await.unwrap();

        assert_eq!(listed[0].diet.status, DietStatus::Active);
        assert!(listed[0].validity.is_expired);
        assert_eq!(fx.events.event_count(), 0);
    }

    #[tokio::test]
    async fn status_filter_applies() {
        let fx = Fixture::new();
        fx.diet(fx.client, fx.nutritionist).await;

        let mut query = own(&fx);
        query.status = Some(DietStatus::Paused);
        assert!(handler(&fx, true).handle(query).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn nutritionist_needs_engagement_to_list() {
        let fx = Fixture::new();
        fx.diet(fx.client, fx.nutritionist).await;
        let query = ListDietsQuery {
            requester_id: fx.nutritionist,
            owner_id: Some(fx.client),
            status: None,
        };

        let err = handler(&fx, true).handle(query.clone()).await.unwrap_err();
        assert!(matches!(err, EngagementError::Forbidden(_)));

        fx.pending_contract(fx.client, fx.nutritionist).await;
        assert_eq!(handler(&fx, true).handle(query).await.unwrap().len(), 1);
    }
}
