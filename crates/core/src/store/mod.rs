//! Storage traits for periods and audit records.
//!
//! The persistence engine is not part of this crate; callers bring an
//! implementation. The in-memory store in [`memory`] backs tests and
//! single-process embedding.

pub mod memory;

use clausura_shared::types::FiscalPeriodId;
use thiserror::Error;

use crate::closure::types::ClosureAction;
use crate::period::types::FiscalPeriod;

pub use memory::{InMemoryAuditStore, InMemoryPeriodStore};

/// Errors reported by storage backends.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Fiscal period not found.
    #[error("Fiscal period not found: {0}")]
    PeriodNotFound(FiscalPeriodId),

    /// Optimistic concurrency check failed.
    #[error("Version conflict: expected {expected}, found {found}")]
    VersionConflict {
        /// Version the caller read before computing the transition.
        expected: u64,
        /// Version currently stored.
        found: u64,
    },

    /// Backend failure (I/O, timeout, poisoned lock).
    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Read/commit access to fiscal period facts.
///
/// `list` must return a consistent snapshot; callers re-evaluate on retry
/// rather than assuming a single read stays authoritative.
pub trait PeriodStore: Send + Sync {
    /// Fetches one period by id.
    fn get(&self, id: FiscalPeriodId) -> Result<FiscalPeriod, StoreError>;

    /// Returns a snapshot of every known period.
    fn list(&self) -> Result<Vec<FiscalPeriod>, StoreError>;

    /// Commits a mutated period conditionally on `expected_version` still
    /// being current. On success the stored version is bumped and the
    /// committed record returned.
    fn commit(
        &self,
        period: FiscalPeriod,
        expected_version: u64,
    ) -> Result<FiscalPeriod, StoreError>;
}

/// Append-only access to the closure audit trail.
pub trait AuditStore: Send + Sync {
    /// Appends one audit record.
    fn append(&self, action: ClosureAction) -> Result<(), StoreError>;

    /// Lists audit records for a period, newest first.
    fn list_for_period(&self, id: FiscalPeriodId) -> Result<Vec<ClosureAction>, StoreError>;
}

/// External ledger queries consulted during rule evaluation.
pub trait LedgerChecks: Send + Sync {
    /// Whether every mandatory document for the period has been filed.
    fn documents_complete(&self, id: FiscalPeriodId) -> bool;

    /// Whether the period still has unreconciled ledger lines.
    fn has_unlettered_entries(&self, id: FiscalPeriodId) -> bool;
}

/// [`LedgerChecks`] implementation with fixed answers.
///
/// Useful for embedding without a ledger backend and for tests.
#[derive(Debug, Clone, Copy)]
pub struct StaticLedgerChecks {
    /// Answer returned by `documents_complete`.
    pub documents_complete: bool,
    /// Answer returned by `has_unlettered_entries`.
    pub has_unlettered_entries: bool,
}

impl Default for StaticLedgerChecks {
    fn default() -> Self {
        Self {
            documents_complete: true,
            has_unlettered_entries: false,
        }
    }
}

impl LedgerChecks for StaticLedgerChecks {
    fn documents_complete(&self, _id: FiscalPeriodId) -> bool {
        self.documents_complete
    }

    fn has_unlettered_entries(&self, _id: FiscalPeriodId) -> bool {
        self.has_unlettered_entries
    }
}
