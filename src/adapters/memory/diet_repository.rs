//! In-memory diet repository.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::diet::{Diet, DietStatus};
use crate::domain::foundation::{DietId, DomainError, ErrorCode, Timestamp, UserId};
use crate::ports::DietRepository;

/// In-memory storage for diets, for tests and local runs.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDietRepository {
    diets: Arc<RwLock<HashMap<DietId, Diet>>>,
    fail_writes: Arc<AtomicBool>,
}

impl InMemoryDietRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent write fail with `DatabaseError`.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub async fn len(&self) -> usize {
        self.diets.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.diets.read().await.is_empty()
    }

    fn check_writable(&self) -> Result<(), DomainError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(DomainError::database("diet store unavailable"));
        }
        Ok(())
    }
}

/// Compare-and-set check shared by `update` and `save_renewal`.
fn guard(
    diets: &HashMap<DietId, Diet>,
    diet: &Diet,
    expected: DietStatus,
) -> Result<(), DomainError> {
    let stored = diets.get(&diet.id).ok_or_else(|| {
        DomainError::new(ErrorCode::DietNotFound, "Diet not found")
            .with_detail("id", diet.id.to_string())
    })?;
    if stored.status != expected || stored.version != diet.version {
        return Err(DomainError::new(
            ErrorCode::ConcurrentModification,
            "Diet was modified concurrently",
        )
        .with_detail("current", stored.status.as_str())
        .with_detail("attempted", format!("write from {}", expected)));
    }
    Ok(())
}

fn bumped(diet: &Diet) -> Diet {
    let mut next = diet.clone();
    next.version += 1;
    next
}

#[async_trait]
impl DietRepository for InMemoryDietRepository {
    async fn insert(&self, diet: &Diet) -> Result<(), DomainError> {
        self.check_writable()?;
        let mut diets = self.diets.write().await;
        if diets.contains_key(&diet.id) {
            return Err(DomainError::database(format!("diet {} already exists", diet.id)));
        }
        diets.insert(diet.id, diet.clone());
        Ok(())
    }

    async fn update(&self, diet: &Diet, expected: DietStatus) -> Result<(), DomainError> {
        self.check_writable()?;
        let mut diets = self.diets.write().await;
        guard(&diets, diet, expected)?;
        diets.insert(diet.id, bumped(diet));
        Ok(())
    }

    async fn save_renewal(
        &self,
        predecessor: &Diet,
        expected: DietStatus,
        successor: &Diet,
    ) -> Result<(), DomainError> {
        self.check_writable()?;
        let mut diets = self.diets.write().await;
        guard(&diets, predecessor, expected)?;
        if diets.contains_key(&successor.id) {
            return Err(DomainError::database(format!(
                "diet {} already exists",
                successor.id
            )));
        }
        diets.insert(predecessor.id, bumped(predecessor));
        diets.insert(successor.id, successor.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &DietId) -> Result<Option<Diet>, DomainError> {
        Ok(self.diets.read().await.get(id).cloned())
    }

    async fn find_by_owner(
        &self,
        owner_id: &UserId,
        status: Option<DietStatus>,
    ) -> Result<Vec<Diet>, DomainError> {
        let diets = self.diets.read().await;
        let mut owned: Vec<Diet> = diets
            .values()
            .filter(|d| &d.owner_id == owner_id)
            .filter(|d| status.map_or(true, |s| d.status == s))
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(owned)
    }

    async fn find_lapsed(
        &self,
        owner_id: Option<&UserId>,
        now: Timestamp,
    ) -> Result<Vec<Diet>, DomainError> {
        let diets = self.diets.read().await;
        Ok(diets
            .values()
            .filter(|d| owner_id.map_or(true, |o| &d.owner_id == o))
            .filter(|d| d.needs_expiry(now))
            .cloned()
            .collect())
    }
}
