//! In-memory party directory.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::engagement::Party;
use crate::domain::foundation::{DomainError, UserId};
use crate::ports::PartyDirectory;

#[derive(Debug, Clone, Default)]
pub struct InMemoryPartyDirectory {
    parties: Arc<RwLock<HashMap<UserId, Party>>>,
}

impl InMemoryPartyDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a directory seeded with the given accounts.
    pub fn with_parties(parties: impl IntoIterator<Item = Party>) -> Self {
        let map = parties.into_iter().map(|p| (p.id, p)).collect();
        Self {
            parties: Arc::new(RwLock::new(map)),
        }
    }

    /// Adds or replaces an account.
    pub async fn insert(&self, party: Party) {
        self.parties.write().await.insert(party.id, party);
    }
}

#[async_trait]
impl PartyDirectory for InMemoryPartyDirectory {
    async fn find(&self, id: &UserId) -> Result<Option<Party>, DomainError> {
        Ok(self.parties.read().await.get(id).cloned())
    }

    async fn display_names(&self, ids: &[UserId]) -> Result<HashMap<UserId, String>, DomainError> {
        let parties = self.parties.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| {
                let name = parties.get(id)?.display_name.as_ref()?;
                Some((*id, name.clone()))
            })
            .collect())
    }
}
