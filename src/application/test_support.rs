//! Fixtures shared by handler tests.

use std::sync::Arc;

use crate::adapters::clock::ManualClock;
use crate::adapters::events::InMemoryEventBus;
use crate::adapters::memory::{
    InMemoryContractRepository, InMemoryDietRepository, InMemoryPartyDirectory,
};
use crate::adapters::stripe::MockPaymentGateway;
use crate::domain::contract::{Contract, ContractStatus, ContractTerms, TermsLimits};
use crate::domain::diet::{Diet, DietContent, DietLimits, DietObjective, DietWindow};
use crate::domain::engagement::{EngagementPolicy, Party};
use crate::domain::foundation::{ContractId, DietId, Timestamp, UserId};
use crate::ports::{Clock, ContractRepository, DietRepository};

use super::EngagementGuard;

pub fn t0() -> Timestamp {
    Timestamp::from_unix_secs(1_700_000_000).unwrap()
}

pub fn terms(months: i64) -> ContractTerms {
    ContractTerms::new(
        5_000,
        "usd",
        months,
        "Monthly nutrition coaching",
        &TermsLimits::default(),
    )
    .unwrap()
}

pub fn content(name: &str) -> DietContent {
    DietContent::new(name, "Three meals, two snacks", DietObjective::FatLoss, 1_800).unwrap()
}

/// In-memory world with one client and one verified nutritionist.
pub struct Fixture {
    pub contracts: Arc<InMemoryContractRepository>,
    pub diets: Arc<InMemoryDietRepository>,
    pub parties: Arc<InMemoryPartyDirectory>,
    pub gateway: Arc<MockPaymentGateway>,
    pub events: Arc<InMemoryEventBus>,
    pub clock: Arc<ManualClock>,
    pub client: UserId,
    pub nutritionist: UserId,
}

impl Fixture {
    pub fn new() -> Self {
        let client = UserId::new();
        let nutritionist = UserId::new();
        let parties = InMemoryPartyDirectory::with_parties([
            Party::client(client, "Ana Client"),
            Party::nutritionist(nutritionist, "Dr. Lee", true),
        ]);

        Self {
            contracts: Arc::new(InMemoryContractRepository::new()),
            diets: Arc::new(InMemoryDietRepository::new()),
            parties: Arc::new(parties),
            gateway: Arc::new(MockPaymentGateway::new()),
            events: Arc::new(InMemoryEventBus::new()),
            clock: Arc::new(ManualClock::new(t0())),
            client,
            nutritionist,
        }
    }

    pub fn guard(&self) -> EngagementGuard {
        self.guard_with(EngagementPolicy::default())
    }

    pub fn guard_with(&self, policy: EngagementPolicy) -> EngagementGuard {
        EngagementGuard::new(self.contracts.clone(), policy)
    }

    pub async fn add_client(&self, name: &str) -> UserId {
        let id = UserId::new();
        self.parties.insert(Party::client(id, name)).await;
        id
    }

    pub async fn add_nutritionist(&self, name: &str, verified: bool) -> UserId {
        let id = UserId::new();
        self.parties
            .insert(Party::nutritionist(id, name, verified))
            .await;
        id
    }

    /// Stores a pending contract already linked to an authorization.
    pub async fn pending_contract(&self, client: UserId, nutritionist: UserId) -> Contract {
        let now = t0();
        let id = ContractId::new();
        let mut contract = Contract::initiate(id, client, nutritionist, terms(1), now).unwrap();
        contract
            .attach_authorization(format!("pi_fixture_{}", id), now)
            .unwrap();
        self.contracts.insert_pending(&contract).await.unwrap();
        contract
    }

    /// Stores a contract activated at `t0`.
    pub async fn active_contract(&self, client: UserId, nutritionist: UserId) -> Contract {
        let mut contract = self.pending_contract(client, nutritionist).await;
        let auth = contract.payment_authorization_id.clone().unwrap();
        contract.activate(&auth, t0()).unwrap();
        self.contracts
            .update(&contract, ContractStatus::Pending)
            .await
            .unwrap();
        contract.version += 1;
        contract
    }

    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    /// Stores an active 30-day diet created at `t0`.
    pub async fn diet(&self, owner: UserId, nutritionist: UserId) -> Diet {
        self.diet_created_at(owner, nutritionist, t0()).await
    }

    pub async fn diet_created_at(
        &self,
        owner: UserId,
        nutritionist: UserId,
        created_at: Timestamp,
    ) -> Diet {
        let diet = Diet::create(
            DietId::new(),
            owner,
            nutritionist,
            content("Cutting plan"),
            DietWindow::default(),
            &DietLimits::default(),
            created_at,
        )
        .unwrap();
        self.diets.insert(&diet).await.unwrap();
        diet
    }
}
