//! ListStalePendingHandler - Query handler for abandoned checkouts.
//!
//! Reporting only. Stale contracts are left for an external cleanup job.

use std::sync::Arc;

use chrono::Duration;

use crate::domain::contract::Contract;
use crate::domain::engagement::EngagementError;
use crate::domain::foundation::Timestamp;
use crate::ports::{Clock, ContractRepository};

#[derive(Debug, Clone, Default)]
pub struct ListStalePendingQuery;

pub struct ListStalePendingHandler {
    contracts: Arc<dyn ContractRepository>,
    clock: Arc<dyn Clock>,
    grace: Duration,
}

impl ListStalePendingHandler {
    pub fn new(contracts: Arc<dyn ContractRepository>, clock: Arc<dyn Clock>, grace: Duration) -> Self {
        Self {
            contracts,
            clock,
            grace,
        }
    }

    pub async fn handle(&self, _query: ListStalePendingQuery) -> Result<Vec<Contract>, EngagementError> {
        let cutoff = Timestamp::from_datetime(*self.clock.now().as_datetime() - self.grace);
        let stale = self.contracts.find_pending_created_before(cutoff).await?;
        if !stale.is_empty() {
            tracing::info!(count = stale.len(), "Stale pending contracts found");
        }
        Ok(stale)
    }
}
