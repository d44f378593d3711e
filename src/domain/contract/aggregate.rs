//! Contract aggregate entity.
//!
//! A contract is the paid engagement between one client and one nutritionist.
//!
//! # Design Decisions
//!
//! - **Money in cents**: amounts are `Money` (i64 cents), never floats
//! - **Set-once payment linkage**: the authorization id is attached exactly once
//! - **Period set on activation**: `starts_at`/`ends_at` exist only once paid
//! - **Versioned**: `version` backs compare-and-set updates in the store

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    ContractId, DomainError, ErrorCode, StateMachine, Timestamp, UserId,
};

use super::{ContractStatus, ContractTerms};

/// Outcome of applying a successful payment to a contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    /// The contract moved from pending to active.
    Activated,
    /// The contract was already active for this authorization; nothing changed.
    AlreadyActive,
}

/// Contract aggregate.
///
/// # Invariants
///
/// - `client_id != nutritionist_id`
/// - `starts_at`/`ends_at` are set together, on activation only
/// - `ends_at = starts_at + 30 * duration_months days`
/// - `validated` is true iff the contract was activated by a reconciled payment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contract {
    pub id: ContractId,
    pub client_id: UserId,
    pub nutritionist_id: UserId,
    pub terms: ContractTerms,

    /// External payment authorization (PaymentIntent) id, set once.
    pub payment_authorization_id: Option<String>,

    pub status: ContractStatus,
    pub validated: bool,
    pub created_at: Timestamp,
    pub starts_at: Option<Timestamp>,
    pub ends_at: Option<Timestamp>,
    pub updated_at: Timestamp,

    /// Incremented by the store on every successful update.
    pub version: i32,
}

impl Contract {
    /// Creates a pending contract.
    ///
    /// # Errors
    ///
    /// `InvalidParty` when the client and nutritionist are the same user.
    pub fn initiate(
        id: ContractId,
        client_id: UserId,
        nutritionist_id: UserId,
        terms: ContractTerms,
        now: Timestamp,
    ) -> Result<Self, DomainError> {
        if client_id == nutritionist_id {
            return Err(DomainError::new(
                ErrorCode::InvalidParty,
                "A user cannot contract with themselves",
            ));
        }

        Ok(Self {
            id,
            client_id,
            nutritionist_id,
            terms,
            payment_authorization_id: None,
            status: ContractStatus::Pending,
            validated: false,
            created_at: now,
            starts_at: None,
            ends_at: None,
            updated_at: now,
            version: 1,
        })
    }

    /// Links the gateway authorization to this contract.
    ///
    /// # Errors
    ///
    /// Fails unless the contract is pending and has no authorization yet.
    pub fn attach_authorization(
        &mut self,
        authorization_id: impl Into<String>,
        now: Timestamp,
    ) -> Result<(), DomainError> {
        let authorization_id = authorization_id.into();
        if authorization_id.trim().is_empty() {
            return Err(DomainError::validation(
                "payment_authorization_id",
                "Authorization id cannot be empty",
            ));
        }
        if self.status != ContractStatus::Pending {
            return Err(self.invalid_transition("attach a payment authorization"));
        }
        if self.payment_authorization_id.is_some() {
            return Err(DomainError::new(
                ErrorCode::InvalidStateTransition,
                "Contract already holds a payment authorization",
            )
            .with_detail("current", "authorized")
            .with_detail("attempted", "attach a payment authorization"));
        }

        self.payment_authorization_id = Some(authorization_id);
        self.updated_at = now;
        Ok(())
    }

    /// Activates the contract after the gateway confirmed the payment.
    ///
    /// Re-applying the same authorization to an active contract is a no-op.
    pub fn activate(
        &mut self,
        authorization_id: &str,
        now: Timestamp,
    ) -> Result<Activation, DomainError> {
        if self.payment_authorization_id.as_deref() != Some(authorization_id) {
            return Err(DomainError::new(
                ErrorCode::InvalidStateTransition,
                "Payment authorization does not belong to this contract",
            )
            .with_detail("current", self.status.as_str())
            .with_detail("attempted", "activate with a foreign authorization"));
        }
        if self.status == ContractStatus::Active {
            return Ok(Activation::AlreadyActive);
        }

        self.transition_to(ContractStatus::Active, "activate")?;
        self.starts_at = Some(now);
        self.ends_at = Some(now.add_months(self.terms.duration.months()));
        self.validated = true;
        self.updated_at = now;
        Ok(Activation::Activated)
    }

    /// Cancels the contract on behalf of `requester`.
    ///
    /// Pending contracts may always be cancelled by their client. Active ones
    /// only while `now` is inside `window` after `starts_at` (`None` = no limit).
    pub fn cancel(
        &mut self,
        requester: &UserId,
        now: Timestamp,
        window: Option<Duration>,
    ) -> Result<(), DomainError> {
        if self.status.is_terminal() {
            return Err(self.invalid_transition("cancel"));
        }
        if requester != &self.client_id {
            return Err(DomainError::new(
                ErrorCode::Forbidden,
                "Only the client can cancel a contract",
            ));
        }
        if let (ContractStatus::Active, Some(window), Some(starts_at)) =
            (self.status, window, self.starts_at)
        {
            if now.duration_since(&starts_at) > window {
                return Err(DomainError::new(
                    ErrorCode::InvalidStateTransition,
                    "Cancellation window has elapsed",
                )
                .with_detail("current", "active past the cancellation window")
                .with_detail("attempted", "cancel"));
            }
        }

        self.transition_to(ContractStatus::Cancelled, "cancel")?;
        self.updated_at = now;
        Ok(())
    }

    /// Marks an active contract as completed once its period has ended.
    pub fn complete(&mut self, now: Timestamp) -> Result<(), DomainError> {
        if !self.is_due_for_completion(now) {
            return Err(self.invalid_transition("complete"));
        }
        self.transition_to(ContractStatus::Completed, "complete")?;
        self.updated_at = now;
        Ok(())
    }

    /// True for pending or active contracts.
    pub fn is_open(&self) -> bool {
        self.status.is_open()
    }

    pub fn is_party(&self, user: &UserId) -> bool {
        &self.client_id == user || &self.nutritionist_id == user
    }

    /// The other party of the contract, if `user` is one of them.
    pub fn counterpart_of(&self, user: &UserId) -> Option<UserId> {
        if &self.client_id == user {
            Some(self.nutritionist_id)
        } else if &self.nutritionist_id == user {
            Some(self.client_id)
        } else {
            None
        }
    }

    pub fn binds(&self, nutritionist_id: &UserId, client_id: &UserId) -> bool {
        &self.nutritionist_id == nutritionist_id && &self.client_id == client_id
    }

    pub fn is_due_for_completion(&self, now: Timestamp) -> bool {
        self.status == ContractStatus::Active
            && self.ends_at.map_or(false, |ends_at| now >= ends_at)
    }

    /// Pending longer than `grace`; a candidate for external cleanup.
    pub fn is_stale_pending(&self, now: Timestamp, grace: Duration) -> bool {
        self.status == ContractStatus::Pending && now.duration_since(&self.created_at) > grace
    }

    fn transition_to(&mut self, target: ContractStatus, attempted: &str) -> Result<(), DomainError> {
        self.status = self
            .status
            .transition_to(target)
            .map_err(|e| self.invalid_transition(attempted).with_detail("reason", e.to_string()))?;
        Ok(())
    }

    fn invalid_transition(&self, attempted: &str) -> DomainError {
        DomainError::new(
            ErrorCode::InvalidStateTransition,
            format!("Cannot {} a {} contract", attempted, self.status),
        )
        .with_detail("current", self.status.as_str())
        .with_detail("attempted", attempted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::contract::TermsLimits;

    fn t0() -> Timestamp {
        Timestamp::from_unix_secs(1_700_000_000).unwrap()
    }

    fn terms(months: i64) -> ContractTerms {
        ContractTerms::new(5_000, "usd", months, "Monthly plan with weekly check-ins", &TermsLimits::default())
            .unwrap()
    }

    fn pending() -> Contract {
        Contract::initiate(ContractId::new(), UserId::new(), UserId::new(), terms(1), t0()).unwrap()
    }

    fn active() -> Contract {
        let mut contract = pending();
        contract.attach_authorization("pi_123", t0()).unwrap();
        contract.activate("pi_123", t0()).unwrap();
        contract
    }

    #[test]
    fn initiate_rejects_self_engagement() {
        let user = UserId::new();
        let err = Contract::initiate(ContractId::new(), user, user, terms(1), t0()).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidParty);
    }

    #[test]
    fn new_contract_is_pending_and_unvalidated() {
        let contract = pending();
        assert_eq!(contract.status, ContractStatus::Pending);
        assert!(!contract.validated);
        assert!(contract.starts_at.is_none());
        assert!(contract.ends_at.is_none());
    }

    #[test]
    fn authorization_is_set_once() {
        let mut contract = pending();
        contract.attach_authorization("pi_1", t0()).unwrap();
        let err = contract.attach_authorization("pi_2", t0()).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidStateTransition);
        assert_eq!(contract.payment_authorization_id.as_deref(), Some("pi_1"));
    }

    #[test]
    fn activation_sets_thirty_day_months_period() {
        let mut contract = Contract::initiate(
            ContractId::new(),
            UserId::new(),
            UserId::new(),
            terms(3),
            t0(),
        )
        .unwrap();
        contract.attach_authorization("pi_9", t0()).unwrap();
        let start = t0().add_hours(2);

        assert_eq!(contract.activate("pi_9", start).unwrap(), Activation::Activated);
        assert_eq!(contract.starts_at, Some(start));
        assert_eq!(contract.ends_at, Some(start.add_days(90)));
        assert!(contract.validated);
    }

    #[test]
    fn second_activation_is_a_no_op() {
        let mut contract = active();
        let before = contract.clone();
        let outcome = contract.activate("pi_123", t0().add_days(3)).unwrap();
        assert_eq!(outcome, Activation::AlreadyActive);
        assert_eq!(contract, before);
    }

    #[test]
    fn activation_with_other_authorization_fails() {
        let mut contract = pending();
        contract.attach_authorization("pi_1", t0()).unwrap();
        assert!(contract.activate("pi_other", t0()).is_err());
        assert_eq!(contract.status, ContractStatus::Pending);
    }

    #[test]
    fn client_can_cancel_pending_contract() {
        let mut contract = pending();
        let client = contract.client_id;
        contract.cancel(&client, t0(), Some(Duration::days(7))).unwrap();
        assert_eq!(contract.status, ContractStatus::Cancelled);
    }

    #[test]
    fn nutritionist_cannot_cancel() {
        let mut contract = active();
        let nutritionist = contract.nutritionist_id;
        let err = contract.cancel(&nutritionist, t0(), None).unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);
        assert_eq!(contract.status, ContractStatus::Active);
    }

    #[test]
    fn cancel_of_terminal_contract_is_invalid_state_for_anyone() {
        let mut contract = active();
        let client = contract.client_id;
        contract.cancel(&client, t0(), None).unwrap();

        for requester in [client, contract.nutritionist_id, UserId::new()] {
            let err = contract.cancel(&requester, t0(), None).unwrap_err();
            assert_eq!(err.code, ErrorCode::InvalidStateTransition);
        }
    }

    #[test]
    fn cancel_after_window_is_rejected() {
        let mut contract = active();
        let client = contract.client_id;
        let err = contract
            .cancel(&client, t0().add_days(8), Some(Duration::days(7)))
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidStateTransition);
        assert_eq!(contract.status, ContractStatus::Active);
    }

    #[test]
    fn complete_requires_end_reached() {
        let mut contract = active();
        assert!(contract.complete(t0().add_days(29)).is_err());
        contract.complete(t0().add_days(30)).unwrap();
        assert_eq!(contract.status, ContractStatus::Completed);
    }

    #[test]
    fn pending_contract_cannot_complete() {
        let mut contract = pending();
        assert!(contract.complete(t0().add_days(400)).is_err());
    }

    #[test]
    fn counterpart_is_the_other_party() {
        let contract = pending();
        assert_eq!(contract.counterpart_of(&contract.client_id), Some(contract.nutritionist_id));
        assert_eq!(contract.counterpart_of(&contract.nutritionist_id), Some(contract.client_id));
        assert_eq!(contract.counterpart_of(&UserId::new()), None);
    }

    #[test]
    fn stale_pending_uses_grace_period() {
        let contract = pending();
        assert!(!contract.is_stale_pending(t0().add_hours(71), Duration::hours(72)));
        assert!(contract.is_stale_pending(t0().add_hours(73), Duration::hours(72)));
    }
}
