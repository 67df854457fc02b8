//! In-memory storage, mutex-guarded.
//!
//! Commits are version-checked so two interleaved closure attempts on the
//! same period cannot both succeed.

use std::collections::HashMap;
use std::sync::Mutex;

use clausura_shared::types::FiscalPeriodId;

use crate::closure::types::ClosureAction;
use crate::period::types::FiscalPeriod;
use crate::store::{AuditStore, PeriodStore, StoreError};

/// In-memory period store.
#[derive(Debug, Default)]
pub struct InMemoryPeriodStore {
    periods: Mutex<HashMap<FiscalPeriodId, FiscalPeriod>>,
}

impl InMemoryPeriodStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the store with externally created periods.
    ///
    /// # Errors
    ///
    /// Returns an error if the lock is poisoned.
    pub fn seed(
        &self,
        periods: impl IntoIterator<Item = FiscalPeriod>,
    ) -> Result<(), StoreError> {
        let mut guard = self
            .periods
            .lock()
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        for period in periods {
            guard.insert(period.id, period);
        }
        Ok(())
    }
}

impl PeriodStore for InMemoryPeriodStore {
    fn get(&self, id: FiscalPeriodId) -> Result<FiscalPeriod, StoreError> {
        let guard = self
            .periods
            .lock()
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        guard.get(&id).cloned().ok_or(StoreError::PeriodNotFound(id))
    }

    fn list(&self) -> Result<Vec<FiscalPeriod>, StoreError> {
        let guard = self
            .periods
            .lock()
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        let mut periods: Vec<_> = guard.values().cloned().collect();
        periods.sort_by(|a, b| a.end_date.cmp(&b.end_date));
        Ok(periods)
    }

    fn commit(
        &self,
        mut period: FiscalPeriod,
        expected_version: u64,
    ) -> Result<FiscalPeriod, StoreError> {
        let mut guard = self
            .periods
            .lock()
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        let stored = guard
            .get(&period.id)
            .ok_or(StoreError::PeriodNotFound(period.id))?;
        if stored.version != expected_version {
            return Err(StoreError::VersionConflict {
                expected: expected_version,
                found: stored.version,
            });
        }
        period.version = expected_version + 1;
        guard.insert(period.id, period.clone());
        Ok(period)
    }
}

/// In-memory append-only audit trail.
#[derive(Debug, Default)]
pub struct InMemoryAuditStore {
    actions: Mutex<Vec<ClosureAction>>,
}

impl InMemoryAuditStore {
    /// Creates an empty audit trail.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl AuditStore for InMemoryAuditStore {
    fn append(&self, action: ClosureAction) -> Result<(), StoreError> {
        let mut guard = self
            .actions
            .lock()
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        guard.push(action);
        Ok(())
    }

    fn list_for_period(&self, id: FiscalPeriodId) -> Result<Vec<ClosureAction>, StoreError> {
        let guard = self
            .actions
            .lock()
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        let mut actions: Vec<_> = guard
            .iter()
            .filter(|a| a.period_id == id)
            .cloned()
            .collect();
        actions.reverse();
        Ok(actions)
    }
}
