//! Derives the lifecycle status of a period from its stored facts.

use chrono::{DateTime, Months, Utc};

use crate::period::types::{FiscalPeriod, PeriodStatus};

/// Pure projection from stored period facts to a lifecycle status.
///
/// Safe for concurrent reads; no side effects. The same facts and instant
/// always produce the same status.
pub struct PeriodStateResolver;

impl PeriodStateResolver {
    /// Resolves the status of `period` as of `now`.
    ///
    /// `lock_after_months` is the configured lock threshold: once that many
    /// calendar months have elapsed since closure, the period is `Locked`.
    /// The archived marker overrides everything else.
    #[must_use]
    pub fn resolve(period: &FiscalPeriod, now: DateTime<Utc>, lock_after_months: u32) -> PeriodStatus {
        if period.archived {
            return PeriodStatus::Archived;
        }

        if !period.is_closed {
            return if period.is_active {
                PeriodStatus::Open
            } else {
                PeriodStatus::Closing
            };
        }

        let locks_at = period
            .closed_at
            .and_then(|closed_at| closed_at.checked_add_months(Months::new(lock_after_months)));
        if locks_at.is_some_and(|t| now >= t) {
            PeriodStatus::Locked
        } else {
            PeriodStatus::Closed
        }
    }
}
