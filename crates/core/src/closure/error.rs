//! Closure error types.
//!
//! All operations return structured errors; partial mutations are never
//! committed.

use thiserror::Error;

use clausura_shared::types::FiscalPeriodId;

use crate::period::types::PeriodStatus;
use crate::store::StoreError;

/// Errors that can occur during closure operations.
#[derive(Debug, Error)]
pub enum ClosureError {
    /// One or more blocking rules or the mandatory-step gate failed.
    #[error("Cannot close period: {}", reasons.join("; "))]
    CannotClose {
        /// Every blocking finding, in rule-definition order.
        reasons: Vec<String>,
    },

    /// Chronological constraint violated.
    #[error("Closure order violation: {0}")]
    OrderViolation(String),

    /// Forced-closure authorization failed.
    #[error("Authorization failed: {0}")]
    AuthorizationError(String),

    /// Attempted mutation on a locked or archived period.
    #[error("Period is {status} and permanently immutable")]
    TerminalStateViolation {
        /// The terminal status that rejected the mutation.
        status: PeriodStatus,
    },

    /// Attempted a transition the lifecycle graph does not allow.
    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition {
        /// The current resolved status.
        from: PeriodStatus,
        /// The attempted target status.
        to: PeriodStatus,
    },

    /// Optimistic concurrency check failed; re-read and retry.
    #[error("Period was modified concurrently; re-evaluate and retry")]
    ConcurrentModification,

    /// Fiscal period not found.
    #[error("Fiscal period not found: {0}")]
    PeriodNotFound(FiscalPeriodId),

    /// Storage backend failure.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl ClosureError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::CannotClose { .. } | Self::InvalidTransition { .. } => 422,
            Self::OrderViolation(_) => 409,
            Self::AuthorizationError(_) => 403,
            Self::TerminalStateViolation { .. } => 410,
            Self::ConcurrentModification => 409,
            Self::PeriodNotFound(_) => 404,
            Self::Storage(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::CannotClose { .. } => "CANNOT_CLOSE",
            Self::OrderViolation(_) => "ORDER_VIOLATION",
            Self::AuthorizationError(_) => "AUTHORIZATION_ERROR",
            Self::TerminalStateViolation { .. } => "TERMINAL_STATE_VIOLATION",
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::ConcurrentModification => "CONCURRENT_MODIFICATION",
            Self::PeriodNotFound(_) => "PERIOD_NOT_FOUND",
            Self::Storage(_) => "STORAGE_ERROR",
        }
    }

    /// True when the caller can correct conditions and retry.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        !matches!(self, Self::TerminalStateViolation { .. })
    }
}

impl From<StoreError> for ClosureError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::PeriodNotFound(id) => Self::PeriodNotFound(id),
            StoreError::VersionConflict { .. } => Self::ConcurrentModification,
            StoreError::Backend(msg) => Self::Storage(msg),
        }
    }
}
